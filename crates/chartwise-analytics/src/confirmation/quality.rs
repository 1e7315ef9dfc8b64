//! 1단계: 품질 게이트.
//!
//! 순서를 보존하는 순수 필터이며 병합은 하지 않습니다.

use super::FilterConfig;
use chartwise_core::PatternInstance;

/// 품질 기준을 통과한 패턴만 남깁니다.
///
/// - 신뢰도 < `min_confidence` → 제거
/// - 가장 좋은 추세선 R² < `min_r_squared` → 제거 (추세선이 없으면 R² = 0)
/// - 이름이 제외 목록에 있으면 제거 (대소문자 무시)
///
/// 두 임계값이 모두 0이고 제외 목록이 비어 있으면 입력을 그대로 돌려줍니다.
pub fn gate(patterns: Vec<PatternInstance>, config: &FilterConfig) -> Vec<PatternInstance> {
    let before = patterns.len();
    let kept: Vec<PatternInstance> = patterns
        .into_iter()
        .filter(|p| passes(p, config))
        .collect();

    tracing::debug!(before, kept = kept.len(), "Quality gate applied");
    kept
}

/// 단일 패턴이 품질 기준을 통과하는지 확인합니다.
pub fn passes(pattern: &PatternInstance, config: &FilterConfig) -> bool {
    pattern.confidence() >= config.min_confidence
        && pattern.best_r_squared() >= config.min_r_squared
        && !config.is_excluded(&pattern.pattern_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartwise_core::PatternSignal;

    fn pattern(id: i64, name: &str, confidence: f64, r2: f64) -> PatternInstance {
        PatternInstance::new(id, name, PatternSignal::Bullish, 0, 10, confidence)
            .with_trendline("support", 0.1, r2)
    }

    #[test]
    fn test_zero_thresholds_are_identity() {
        let input = vec![
            pattern(1, "Double Bottom", 0.0, 0.0),
            PatternInstance::new(2, "Bullish Flag", PatternSignal::Bullish, 3, 9, f64::NAN),
            pattern(3, "Rounding Bottom", 0.9, 0.2),
        ];
        let out = gate(input.clone(), &FilterConfig::default());
        assert_eq!(out, input);
    }

    #[test]
    fn test_thresholds_and_order() {
        let config = FilterConfig {
            min_confidence: 0.5,
            min_r_squared: 0.6,
            ..Default::default()
        };
        let input = vec![
            pattern(1, "Double Top", 0.55, 0.7),
            pattern(2, "Double Top", 0.45, 0.9),
            pattern(3, "Triple Top", 0.8, 0.5),
            pattern(4, "Bearish Flag", 0.9, 0.95),
            PatternInstance::new(5, "Cup", PatternSignal::Bullish, 0, 10, 0.9),
        ];
        let ids: Vec<i64> = gate(input, &config).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_best_trendline_counts() {
        let config = FilterConfig {
            min_r_squared: 0.8,
            ..Default::default()
        };
        let p = pattern(1, "Symmetrical Triangle", 0.7, 0.3).with_trendline("resistance", -0.2, 0.85);
        assert!(passes(&p, &config));
    }

    #[test]
    fn test_exclusions() {
        let config = FilterConfig::multi_timeframe();
        assert!(!passes(&pattern(1, "rounding top", 0.9, 0.9), &config));
        assert!(!passes(&pattern(2, "Rounding Bottom", 0.9, 0.9), &config));
        assert!(passes(&pattern(3, "Double Top", 0.9, 0.9), &config));
    }
}
