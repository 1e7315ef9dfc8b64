//! 오프라인 명령 (`radar`, `confirm`).
//!
//! 백엔드 없이 JSON 파일을 읽어 집계/확인 파이프라인만 실행합니다.

use anyhow::{Context, Result};
use chartwise_analytics::{
    chart_pattern_signal, summarize, ConfirmationBoost, ConfirmedPattern, FilterConfig,
    PatternConfirmationFilter, RadarModel, SignalAggregator,
};
use chartwise_core::serde_helpers::lenient_list;
use chartwise_core::{
    DetectSummary, DetectionSettings, PatternInstance, PatternsResponse, Recommendation,
    RecommendationRecord, SourceSignal,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// 추천 파일을 레이더 모델로 집계합니다. 파일이 `null`이면 `None`.
pub fn run_radar(path: &Path) -> Result<Option<RadarModel>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recommendation file: {}", path.display()))?;
    let record: Option<RecommendationRecord> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid recommendation JSON: {}", path.display()))?;

    let recommendation = record.map(Recommendation::from);
    Ok(SignalAggregator::new().aggregate(recommendation.as_ref()))
}

/// 패턴 파일 형식: 배열 또는 `{"patterns": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PatternFile {
    List(#[serde(deserialize_with = "lenient_list")] Vec<PatternInstance>),
    Response(PatternsResponse),
}

/// 패턴 파일을 읽습니다.
pub fn load_patterns(path: &Path) -> Result<Vec<PatternInstance>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pattern file: {}", path.display()))?;
    let file: PatternFile = serde_json::from_str(&text)
        .with_context(|| format!("Invalid pattern JSON: {}", path.display()))?;

    Ok(match file {
        PatternFile::List(patterns) => patterns,
        PatternFile::Response(response) => response.patterns,
    })
}

/// 확인 파이프라인 실행 결과.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmReport {
    /// 입력 패턴 요약
    pub input: DetectSummary,
    /// 확인 패턴
    pub patterns: Vec<ConfirmedPattern>,
    /// 확인 패턴에서 계산한 차트 패턴 신호
    pub chart_pattern: SourceSignal,
}

/// 패턴 파일에 확인 파이프라인을 실행합니다.
pub fn run_confirm(path: &Path, settings: &DetectionSettings) -> Result<ConfirmReport> {
    let raw = load_patterns(path)?;
    let input = summarize(&raw);

    let filter = PatternConfirmationFilter::new(FilterConfig::from_settings(settings));
    let patterns = filter.confirm(raw);
    let chart_pattern = chart_pattern_signal(&patterns, &ConfirmationBoost::default());

    info!(
        input = input.total_patterns,
        confirmed = patterns.len(),
        signal = %chart_pattern.label(),
        "Confirmation pipeline finished"
    );

    Ok(ConfirmReport {
        input,
        patterns,
        chart_pattern,
    })
}
