//! 패턴 개수 요약.

use chartwise_core::{DetectSummary, PatternInstance, PatternSignal, PatternType};

/// 감지 응답과 같은 형태의 개수 요약을 계산합니다.
pub fn summarize<'a, I>(patterns: I) -> DetectSummary
where
    I: IntoIterator<Item = &'a PatternInstance>,
{
    patterns
        .into_iter()
        .fold(DetectSummary::default(), |mut summary, pattern| {
            summary.total_patterns += 1;
            match pattern.pattern_type {
                PatternType::Reversal => summary.reversal_patterns += 1,
                PatternType::Continuation => summary.continuation_patterns += 1,
            }
            match pattern.signal {
                PatternSignal::Bullish => summary.bullish_count += 1,
                PatternSignal::Bearish => summary.bearish_count += 1,
                PatternSignal::Neutral => summary.neutral_count += 1,
            }
            summary
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let patterns = vec![
            PatternInstance::new(1, "Double Top", PatternSignal::Bearish, 0, 10, 0.5),
            PatternInstance::new(2, "Bullish Flag", PatternSignal::Bullish, 0, 10, 0.5)
                .with_type(PatternType::Continuation),
            PatternInstance::new(3, "Symmetrical Triangle", PatternSignal::Neutral, 0, 10, 0.5)
                .with_type(PatternType::Continuation),
        ];
        let summary = summarize(&patterns);
        assert_eq!(summary.total_patterns, 3);
        assert_eq!(summary.reversal_patterns, 1);
        assert_eq!(summary.continuation_patterns, 2);
        assert_eq!(
            (summary.bullish_count, summary.bearish_count, summary.neutral_count),
            (1, 1, 1)
        );
        assert_eq!(summarize(&[]), DetectSummary::default());
    }
}
