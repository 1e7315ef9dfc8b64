//! 2단계: 겹치는 패턴 중복 제거.
//!
//! 같은 시장 구조가 피크 감지 민감도에 따라 여러 번 잡히는 경우가 많습니다.
//! 이름이 같은 패턴끼리 구간이 겹치면 신뢰도가 높은 쪽만 남기고,
//! 동률이면 먼저 감지된(입력 순서가 앞선) 쪽을 남깁니다.
//!
//! 구간이 같더라도 이름이 다르면 중복이 아닙니다. 하나의 구조가 여러 패턴
//! 정의를 동시에 만족할 수 있기 때문입니다.

use chartwise_core::PatternInstance;

/// 두 패턴이 "겹친다"고 판단하는 정책.
///
/// 구현은 대칭이어야 합니다 (`overlaps(a, b) == overlaps(b, a)`).
pub trait OverlapPolicy {
    /// 두 패턴의 구간이 겹치는지 확인합니다.
    fn overlaps(&self, a: &PatternInstance, b: &PatternInstance) -> bool;
}

/// 교집합 길이가 더 짧은 구간 길이의 `threshold` 비율을 넘으면 겹침.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShorterSpanOverlap {
    /// 겹침 임계값 (0.0 ~ 1.0)
    pub threshold: f64,
}

impl ShorterSpanOverlap {
    /// 기본 임계값 (5%).
    pub const DEFAULT_THRESHOLD: f64 = 0.05;

    /// 새 정책을 생성합니다.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// 교집합 / 짧은 구간 길이 (0.0 ~ 1.0).
    ///
    /// 두 패턴 모두 시각이 있으면 시각 구간 `[start, end)`를,
    /// 아니면 봉 인덱스 구간 `[start, end]`를 비교합니다.
    pub fn overlap_ratio(a: &PatternInstance, b: &PatternInstance) -> f64 {
        let ((s1, e1), (s2, e2)) = comparable_spans(a, b);
        let intersection = e1.min(e2) - s1.max(s2);
        let shorter = (e1 - s1).min(e2 - s2);

        if shorter <= 0.0 {
            // 길이 0 구간: 다른 구간 안에 있으면 완전히 겹친 것으로 봄
            return if intersection >= 0.0 { 1.0 } else { 0.0 };
        }
        if intersection <= 0.0 {
            return 0.0;
        }
        (intersection / shorter).min(1.0)
    }
}

impl Default for ShorterSpanOverlap {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl OverlapPolicy for ShorterSpanOverlap {
    fn overlaps(&self, a: &PatternInstance, b: &PatternInstance) -> bool {
        Self::overlap_ratio(a, b) > self.threshold
    }
}

fn comparable_spans(a: &PatternInstance, b: &PatternInstance) -> ((f64, f64), (f64, f64)) {
    match (a.date_span(), b.date_span()) {
        (Some((s1, e1)), Some((s2, e2))) => (
            (s1.timestamp_millis() as f64, e1.timestamp_millis() as f64),
            (s2.timestamp_millis() as f64, e2.timestamp_millis() as f64),
        ),
        _ => {
            let (s1, e1) = a.index_span();
            let (s2, e2) = b.index_span();
            // 인덱스는 끝을 포함하므로 [start, end + 1)로 바꿔 비교
            (
                (s1 as f64, e1 as f64 + 1.0),
                (s2 as f64, e2 as f64 + 1.0),
            )
        }
    }
}

/// 두 패턴이 같은 이름인지 확인합니다 (앞뒤 공백, 대소문자 무시).
pub fn same_name(a: &PatternInstance, b: &PatternInstance) -> bool {
    a.pattern_name
        .trim()
        .eq_ignore_ascii_case(b.pattern_name.trim())
}

/// 이름이 같고 구간이 겹치는 패턴 중 하나만 남깁니다.
///
/// 결과는 입력 순서를 유지합니다. 출력에는 더 이상 겹치는 쌍이 없으므로
/// 결과에 다시 적용해도 아무것도 제거되지 않습니다.
pub fn deduplicate(
    patterns: Vec<PatternInstance>,
    policy: &dyn OverlapPolicy,
) -> Vec<PatternInstance> {
    // 신뢰도 내림차순, 동률이면 입력 순서
    let mut order: Vec<usize> = (0..patterns.len()).collect();
    order.sort_by(|&i, &j| {
        patterns[j]
            .confidence()
            .total_cmp(&patterns[i].confidence())
            .then(i.cmp(&j))
    });

    let mut kept: Vec<usize> = Vec::with_capacity(patterns.len());
    for candidate in order {
        let duplicate = kept.iter().any(|&k| {
            same_name(&patterns[k], &patterns[candidate])
                && policy.overlaps(&patterns[k], &patterns[candidate])
        });
        if duplicate {
            tracing::trace!(
                id = patterns[candidate].id,
                name = %patterns[candidate].pattern_name,
                "Overlapping pattern dropped"
            );
        } else {
            kept.push(candidate);
        }
    }
    kept.sort_unstable();

    let before = patterns.len();
    let mut slots: Vec<Option<PatternInstance>> = patterns.into_iter().map(Some).collect();
    let result: Vec<PatternInstance> = kept
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();

    tracing::debug!(before, kept = result.len(), "Overlap deduplication applied");
    result
}
