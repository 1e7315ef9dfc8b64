//! 신호 집계 및 패턴 확인 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 소스별 매매 신호 → 레이더 차트 모델 집계
//! - 다중 타임프레임 패턴 확인 필터 (품질 게이트, 중복 제거, 병합)
//! - 확인 패턴 → 차트 패턴 신호 요약
//! - 패턴 개수 요약
//!
//! 모든 연산은 순수 함수이며 I/O나 공유 상태가 없습니다.
//!
//! # Re-exports
//!
//! - [`radar`]: 레이더 모델 (SignalAggregator, RadarModel, DecisionThresholds)
//! - [`confirmation`]: 패턴 확인 (PatternConfirmationFilter, FilterConfig)

pub mod chart_signal;
pub mod confirmation;
pub mod radar;
pub mod summary;

// Radar 모듈 re-exports
pub use radar::{
    aggregate, directional_score, DecisionThresholds, RadarModel, RadarPoint, SignalAggregator,
    ThresholdZone, RADAR_DOMAIN, RADAR_OFFSET,
};

// Confirmation 모듈 re-exports
pub use confirmation::{
    AlignmentPolicy, ConfirmedPattern, FilterConfig, OverlapPolicy, PatternConfirmationFilter,
    RegionAgreement, ShorterSpanOverlap, TimeframePatterns,
};

pub use chart_signal::{chart_pattern_signal, ConfirmationBoost};
pub use summary::summarize;
