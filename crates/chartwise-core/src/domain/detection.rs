//! 패턴 감지 요청/응답 계약.
//!
//! 사용자는 겹침 임계값, 최소 신뢰도, 최소 R²를 정수 퍼센트로 편집합니다.
//! 백엔드와 필터링 로직은 항상 [0, 1] 비율을 사용하므로 경계에서 변환합니다.

use super::pattern::PatternInstance;
use super::serde_helpers::{lenient_list, lenient_usize};
use serde::{Deserialize, Serialize};

/// 다중 타임프레임 흐름에서 기본으로 제외하는 패턴.
pub const DEFAULT_MULTI_TIMEFRAME_EXCLUSIONS: [&str; 2] = ["Rounding Top", "Rounding Bottom"];

/// 사용자 편집용 감지 설정 (퍼센트 단위).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// 분석 기간 (일). `None`이면 백엔드 기본값
    pub days: Option<u32>,
    /// 겹치는 패턴 제거 여부
    pub remove_overlaps: bool,
    /// 겹침 임계값 (%)
    pub overlap_threshold_pct: u8,
    /// 피크 감지 민감도 (양쪽 비교 봉 수)
    pub peak_order: u32,
    /// 최소 신뢰도 (%)
    pub min_confidence_pct: u8,
    /// 최소 추세선 R² (%)
    pub min_r_squared_pct: u8,
    /// 제외할 패턴 이름
    pub exclude_patterns: Vec<String>,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            days: None,
            remove_overlaps: true,
            overlap_threshold_pct: 5,
            peak_order: 5,
            min_confidence_pct: 0,
            min_r_squared_pct: 0,
            exclude_patterns: Vec::new(),
        }
    }
}

impl DetectionSettings {
    /// 다중 타임프레임 기본값 (Rounding Top/Bottom 제외).
    pub fn multi_timeframe() -> Self {
        Self {
            exclude_patterns: DEFAULT_MULTI_TIMEFRAME_EXCLUSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..Default::default()
        }
    }

    /// 백엔드로 보낼 요청 본문 (비율 단위).
    pub fn to_request(&self) -> DetectRequest {
        DetectRequest {
            remove_overlaps: self.remove_overlaps,
            exclude_patterns: self.exclude_patterns.clone(),
            overlap_threshold: percent_to_fraction(self.overlap_threshold_pct),
            peak_order: self.peak_order,
            min_confidence: percent_to_fraction(self.min_confidence_pct),
            min_r_squared: percent_to_fraction(self.min_r_squared_pct),
        }
    }
}

/// 정수 퍼센트를 [0, 1] 비율로 변환합니다. 100 초과는 1로 제한됩니다.
pub fn percent_to_fraction(pct: u8) -> f64 {
    f64::from(pct.min(100)) / 100.0
}

/// `POST detect` 요청 본문.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    pub remove_overlaps: bool,
    pub exclude_patterns: Vec<String>,
    pub overlap_threshold: f64,
    pub peak_order: u32,
    pub min_confidence: f64,
    pub min_r_squared: f64,
}

/// `POST detect` 응답 요약.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectSummary {
    #[serde(deserialize_with = "lenient_usize")]
    pub total_patterns: usize,
    #[serde(deserialize_with = "lenient_usize")]
    pub reversal_patterns: usize,
    #[serde(deserialize_with = "lenient_usize")]
    pub continuation_patterns: usize,
    #[serde(deserialize_with = "lenient_usize")]
    pub bullish_count: usize,
    #[serde(deserialize_with = "lenient_usize")]
    pub bearish_count: usize,
    #[serde(deserialize_with = "lenient_usize")]
    pub neutral_count: usize,
}

/// `GET patterns` 응답.
///
/// 레코드는 하나씩 읽으므로 읽을 수 없는 레코드가 있어도 나머지는 유지됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternsResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub patterns: Vec<PatternInstance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_conversion() {
        let settings = DetectionSettings {
            overlap_threshold_pct: 15,
            min_confidence_pct: 60,
            min_r_squared_pct: 250,
            ..Default::default()
        };
        let req = settings.to_request();
        assert!((req.overlap_threshold - 0.15).abs() < 1e-12);
        assert!((req.min_confidence - 0.60).abs() < 1e-12);
        assert_eq!(req.min_r_squared, 1.0);
        assert!(req.remove_overlaps);
        assert_eq!(req.peak_order, 5);
    }

    #[test]
    fn test_request_wire_names() {
        let req = DetectionSettings::multi_timeframe().to_request();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["removeOverlaps"], true);
        assert_eq!(json["overlapThreshold"], 0.05);
        assert_eq!(json["excludePatterns"][0], "Rounding Top");
        assert_eq!(json["minRSquared"], 0.0);
    }

    #[test]
    fn test_summary_tolerates_missing_fields() {
        let summary: DetectSummary =
            serde_json::from_value(serde_json::json!({ "total_patterns": 4 })).unwrap();
        assert_eq!(summary.total_patterns, 4);
        assert_eq!(summary.neutral_count, 0);
    }

    #[test]
    fn test_summary_tolerates_null_and_strings() {
        let summary: DetectSummary = serde_json::from_value(serde_json::json!({
            "total_patterns": "6",
            "bullish_count": null,
            "bearish_count": -2
        }))
        .unwrap();
        assert_eq!(summary.total_patterns, 6);
        assert_eq!(summary.bullish_count, 0);
        assert_eq!(summary.bearish_count, 0);
    }

    #[test]
    fn test_one_bad_record_keeps_the_rest() {
        let body = r#"{"patterns": [
            {"id": 1, "pattern_name": "Double Top", "signal": "bearish", "confidence_score": 0.8},
            {"id": 2, "confidence_score": null, "pattern_name": null, "signal": null,
             "pattern_type": null, "start_index": -1, "trendlines": null},
            42,
            {"id": 3, "pattern_name": "Bull Flag", "signal": "bullish",
             "start_index": 5, "end_index": 20, "confidence_score": "0.65"}
        ]}"#;
        let response: PatternsResponse = serde_json::from_str(body).unwrap();

        let ids: Vec<i64> = response.patterns.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let defaulted = &response.patterns[1];
        assert_eq!(defaulted.confidence_score, 0.0);
        assert_eq!(defaulted.pattern_name, "");
        assert_eq!(defaulted.signal, crate::PatternSignal::Neutral);
        assert_eq!(defaulted.pattern_type, crate::PatternType::Reversal);
        assert_eq!(defaulted.start_index, 0);

        assert_eq!(response.patterns[2].confidence_score, 0.65);
        assert_eq!(response.patterns[2].index_span(), (5, 20));
    }

    #[test]
    fn test_missing_or_null_pattern_list_is_empty() {
        let response: PatternsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.patterns.is_empty());
        let response: PatternsResponse = serde_json::from_str(r#"{"patterns": null}"#).unwrap();
        assert!(response.patterns.is_empty());
    }
}
