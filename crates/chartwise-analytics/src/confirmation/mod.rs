//! 다중 타임프레임 패턴 확인 필터.
//!
//! 백엔드가 돌려준 원본 패턴 목록(같은 구조가 1h/4h/1d에서 따로 잡혀
//! 중복될 수 있음)을 화면에 보여줄 확인 패턴 목록으로 바꿉니다.
//! 세 단계는 항상 이 순서로 실행됩니다:
//!
//! 1. [`quality`] - 신뢰도/R²/제외 목록 게이트 (타임프레임별)
//! 2. [`overlap`] - 겹치는 동일 패턴 중복 제거 (타임프레임별)
//! 3. [`merge`] - 타임프레임 간 확인 병합
//!
//! 각 단계의 출력이 다음 단계의 유일한 입력이며 공유 상태는 없습니다.
//!
//! # 사용 예시
//!
//! ```rust
//! use chartwise_analytics::confirmation::{FilterConfig, PatternConfirmationFilter};
//! use chartwise_core::{PatternInstance, PatternSignal, Timeframe};
//!
//! let raw = vec![
//!     PatternInstance::new(1, "Double Top", PatternSignal::Bearish, 10, 40, 0.6)
//!         .on_timeframes(&[Timeframe::H1]),
//!     PatternInstance::new(2, "Double Top", PatternSignal::Bearish, 12, 42, 0.7)
//!         .on_timeframes(&[Timeframe::H4]),
//! ];
//!
//! let filter = PatternConfirmationFilter::new(FilterConfig::default());
//! let confirmed = filter.confirm(raw);
//! assert_eq!(confirmed.len(), 1);
//! assert_eq!(confirmed[0].confirmation_level, 2);
//! ```

pub mod merge;
pub mod overlap;
pub mod quality;

use chartwise_core::{
    DetectionSettings, PatternInstance, Timeframe, DEFAULT_MULTI_TIMEFRAME_EXCLUSIONS,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub use merge::{AlignmentPolicy, RegionAgreement};
pub use overlap::{OverlapPolicy, ShorterSpanOverlap};

/// 필터 설정 (모든 비율은 0.0 ~ 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// 최소 신뢰도 (0 = 비활성)
    pub min_confidence: f64,
    /// 최소 추세선 R² (0 = 비활성)
    pub min_r_squared: f64,
    /// 제외할 패턴 이름
    pub exclude_patterns: BTreeSet<String>,
    /// 겹치는 패턴 제거 여부
    pub remove_overlaps: bool,
    /// 겹침 임계값 (짧은 구간 대비 비율)
    pub overlap_threshold: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            min_r_squared: 0.0,
            exclude_patterns: BTreeSet::new(),
            remove_overlaps: true,
            overlap_threshold: ShorterSpanOverlap::DEFAULT_THRESHOLD,
        }
    }
}

impl FilterConfig {
    /// 다중 타임프레임 흐름의 기본값 (Rounding Top/Bottom 제외).
    pub fn multi_timeframe() -> Self {
        Self {
            exclude_patterns: DEFAULT_MULTI_TIMEFRAME_EXCLUSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..Default::default()
        }
    }

    /// 사용자 감지 설정(퍼센트)에서 생성합니다.
    pub fn from_settings(settings: &DetectionSettings) -> Self {
        let request = settings.to_request();
        Self {
            min_confidence: request.min_confidence,
            min_r_squared: request.min_r_squared,
            exclude_patterns: request.exclude_patterns.into_iter().collect(),
            remove_overlaps: request.remove_overlaps,
            overlap_threshold: request.overlap_threshold,
        }
    }

    /// 이름이 제외 목록에 있는지 확인합니다 (대소문자 무시).
    pub fn is_excluded(&self, pattern_name: &str) -> bool {
        let name = pattern_name.trim();
        self.exclude_patterns
            .iter()
            .any(|excluded| excluded.trim().eq_ignore_ascii_case(name))
    }

    /// 1단계가 아무것도 거르지 않는 설정인지 확인합니다.
    pub fn is_identity_gate(&self) -> bool {
        self.min_confidence <= 0.0 && self.min_r_squared <= 0.0 && self.exclude_patterns.is_empty()
    }
}

/// 한 타임프레임에서 감지된 패턴 목록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframePatterns {
    /// 감지 타임프레임
    pub timeframe: Timeframe,
    /// 패턴 목록
    pub patterns: Vec<PatternInstance>,
}

impl TimeframePatterns {
    /// 새 목록을 생성합니다.
    pub fn new(timeframe: Timeframe, patterns: Vec<PatternInstance>) -> Self {
        Self {
            timeframe,
            patterns,
        }
    }
}

/// 타임프레임 확인 정보가 붙은 패턴.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedPattern {
    /// 대표 패턴 (가장 세밀한 타임프레임). `detected_on_timeframes`는 병합된 합집합
    #[serde(flatten)]
    pub pattern: PatternInstance,
    /// 확인된 타임프레임 수 (1 ~ 3)
    pub confirmation_level: usize,
    /// 타임프레임 간 방향 일치도. 확인 수준 2 이상에서만 존재
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_score: Option<f64>,
    /// 타임프레임 가중 전 신뢰도 (대표 패턴의 신뢰도)
    pub base_confidence: f64,
    /// 병합된 원본 패턴 ID
    pub merged_ids: Vec<i64>,
}

impl ConfirmedPattern {
    /// 확인된 타임프레임 집합.
    pub fn timeframes(&self) -> BTreeSet<Timeframe> {
        self.pattern.timeframes()
    }

    /// 둘 이상의 타임프레임에서 확인되었는지 확인합니다.
    pub fn is_multi_timeframe(&self) -> bool {
        self.confirmation_level >= 2
    }
}

/// 3단계 확인 파이프라인.
pub struct PatternConfirmationFilter {
    config: FilterConfig,
    overlap: Box<dyn OverlapPolicy + Send + Sync>,
    alignment: Box<dyn AlignmentPolicy + Send + Sync>,
}

impl PatternConfirmationFilter {
    /// 기본 정책으로 필터를 생성합니다.
    pub fn new(config: FilterConfig) -> Self {
        let overlap = Box::new(ShorterSpanOverlap::new(config.overlap_threshold));
        Self {
            config,
            overlap,
            alignment: Box::new(RegionAgreement),
        }
    }

    /// 겹침 판정 정책을 교체합니다.
    pub fn with_overlap_policy(mut self, policy: impl OverlapPolicy + Send + Sync + 'static) -> Self {
        self.overlap = Box::new(policy);
        self
    }

    /// 방향 일치도 정책을 교체합니다.
    pub fn with_alignment_policy(
        mut self,
        policy: impl AlignmentPolicy + Send + Sync + 'static,
    ) -> Self {
        self.alignment = Box::new(policy);
        self
    }

    /// 현재 설정.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// 한 타임프레임 목록에 1단계와 2단계를 적용합니다.
    pub fn prepare(&self, patterns: Vec<PatternInstance>) -> Vec<PatternInstance> {
        let gated = quality::gate(patterns, &self.config);
        if self.config.remove_overlaps {
            overlap::deduplicate(gated, self.overlap.as_ref())
        } else {
            gated
        }
    }

    /// 타임프레임별 목록을 확인 패턴 목록으로 만듭니다.
    pub fn confirm_timeframes(&self, lists: Vec<TimeframePatterns>) -> Vec<ConfirmedPattern> {
        let prepared: Vec<TimeframePatterns> = lists
            .into_iter()
            .map(|list| TimeframePatterns::new(list.timeframe, self.prepare(list.patterns)))
            .collect();

        merge::merge_timeframes(&prepared, self.overlap.as_ref(), self.alignment.as_ref())
    }

    /// 평탄한 패턴 목록을 처리합니다.
    ///
    /// 각 레코드의 가장 세밀한 타임프레임 태그로 나눈 뒤 처리합니다.
    /// 태그가 없는 레코드는 일봉으로 봅니다.
    pub fn confirm(&self, patterns: Vec<PatternInstance>) -> Vec<ConfirmedPattern> {
        let partitioned: BTreeMap<Timeframe, Vec<PatternInstance>> =
            patterns.into_iter().fold(BTreeMap::new(), |mut acc, p| {
                acc.entry(p.finest_timeframe()).or_insert_with(Vec::new).push(p);
                acc
            });

        let lists = partitioned
            .into_iter()
            .map(|(timeframe, patterns)| TimeframePatterns::new(timeframe, patterns))
            .collect();
        self.confirm_timeframes(lists)
    }
}

impl Default for PatternConfirmationFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl std::fmt::Debug for PatternConfirmationFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternConfirmationFilter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
