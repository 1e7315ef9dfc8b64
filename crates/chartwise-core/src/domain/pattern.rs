//! 감지된 차트 패턴 레코드.
//!
//! 패턴 감지는 백엔드가 수행하고, 여기서는 결과 계약만 정의합니다.
//! 오래된 레코드나 일부 필드가 빠진 레코드도 목록 전체를 비우지 않도록
//! 역직렬화 단계에서 기본값을 채웁니다.

use super::serde_helpers::{
    lenient_f64, lenient_i64, lenient_opt_date, lenient_string, lenient_usize,
};
use super::signal::clamp_unit;
use crate::types::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 차트 패턴 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// 반전 패턴
    #[default]
    Reversal,
    /// 지속 패턴
    Continuation,
}

impl From<String> for PatternType {
    fn from(raw: String) -> Self {
        if raw.trim().eq_ignore_ascii_case("continuation") {
            PatternType::Continuation
        } else {
            PatternType::Reversal
        }
    }
}

impl<'de> Deserialize<'de> for PatternType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_string(deserializer).map(Self::from)
    }
}

/// 패턴이 암시하는 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSignal {
    /// 상승
    Bullish,
    /// 하락
    Bearish,
    /// 방향 불확실
    #[default]
    Neutral,
}

impl From<String> for PatternSignal {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bullish" | "buy" => PatternSignal::Bullish,
            "bearish" | "sell" => PatternSignal::Bearish,
            _ => PatternSignal::Neutral,
        }
    }
}

impl<'de> Deserialize<'de> for PatternSignal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_string(deserializer).map(Self::from)
    }
}

impl fmt::Display for PatternSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternSignal::Bullish => write!(f, "bullish"),
            PatternSignal::Bearish => write!(f, "bearish"),
            PatternSignal::Neutral => write!(f, "neutral"),
        }
    }
}

/// 추세선 적합 결과.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendlineFit {
    /// 기울기
    #[serde(default, deserialize_with = "lenient_f64")]
    pub slope: f64,
    /// 결정계수 (0.0 ~ 1.0)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub r_squared: f64,
}

/// 백엔드가 감지한 패턴 후보 한 건.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternInstance {
    /// 패턴 ID
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    /// 패턴 이름 (예: "Double Top")
    #[serde(default, deserialize_with = "lenient_string")]
    pub pattern_name: String,
    /// 반전/지속 분류
    #[serde(default)]
    pub pattern_type: PatternType,
    /// 방향
    #[serde(default)]
    pub signal: PatternSignal,
    /// 시작 봉 인덱스
    #[serde(default, deserialize_with = "lenient_usize")]
    pub start_index: usize,
    /// 종료 봉 인덱스 (포함)
    #[serde(default, deserialize_with = "lenient_usize")]
    pub end_index: usize,
    /// 시작 시각 (있으면 타임프레임 간 비교에 사용)
    #[serde(
        default,
        deserialize_with = "lenient_opt_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<DateTime<Utc>>,
    /// 종료 시각
    #[serde(
        default,
        deserialize_with = "lenient_opt_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<DateTime<Utc>>,
    /// 신뢰도 (0.0 ~ 1.0)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence_score: f64,
    /// 이름 붙은 추세선별 적합 결과 (예: "resistance", "neckline")
    #[serde(default, deserialize_with = "deserialize_trendlines")]
    pub trendlines: BTreeMap<String, TrendlineFit>,
    /// 감지된 타임프레임 태그
    #[serde(default, deserialize_with = "deserialize_timeframes")]
    pub detected_on_timeframes: Vec<Timeframe>,
}

impl PatternInstance {
    /// 테스트와 CLI 입력용 생성자.
    pub fn new(
        id: i64,
        pattern_name: impl Into<String>,
        signal: PatternSignal,
        start_index: usize,
        end_index: usize,
        confidence_score: f64,
    ) -> Self {
        Self {
            id,
            pattern_name: pattern_name.into(),
            signal,
            start_index,
            end_index,
            confidence_score,
            ..Default::default()
        }
    }

    /// 분류를 설정합니다.
    pub fn with_type(mut self, pattern_type: PatternType) -> Self {
        self.pattern_type = pattern_type;
        self
    }

    /// 추세선을 추가합니다.
    pub fn with_trendline(mut self, name: impl Into<String>, slope: f64, r_squared: f64) -> Self {
        self.trendlines
            .insert(name.into(), TrendlineFit { slope, r_squared });
        self
    }

    /// 감지 타임프레임을 설정합니다.
    pub fn on_timeframes(mut self, timeframes: &[Timeframe]) -> Self {
        self.detected_on_timeframes = timeframes.to_vec();
        self
    }

    /// 시각 구간을 설정합니다.
    pub fn with_dates(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// 정제된 신뢰도 (NaN → 0, [0, 1]로 제한).
    pub fn confidence(&self) -> f64 {
        clamp_unit(self.confidence_score)
    }

    /// 가장 좋은 추세선의 결정계수. 추세선이 없으면 0.
    pub fn best_r_squared(&self) -> f64 {
        self.trendlines
            .values()
            .map(|t| clamp_unit(t.r_squared))
            .fold(0.0, f64::max)
    }

    /// 감지 타임프레임 집합. 태그가 없으면 `{1d}`.
    pub fn timeframes(&self) -> BTreeSet<Timeframe> {
        if self.detected_on_timeframes.is_empty() {
            BTreeSet::from([Timeframe::LEGACY_DEFAULT])
        } else {
            self.detected_on_timeframes.iter().copied().collect()
        }
    }

    /// 가장 세밀한 감지 타임프레임.
    pub fn finest_timeframe(&self) -> Timeframe {
        self.timeframes()
            .into_iter()
            .next()
            .unwrap_or(Timeframe::LEGACY_DEFAULT)
    }

    /// 봉 인덱스 구간 (start <= end로 정렬).
    pub fn index_span(&self) -> (usize, usize) {
        if self.start_index <= self.end_index {
            (self.start_index, self.end_index)
        } else {
            (self.end_index, self.start_index)
        }
    }

    /// 시각 구간. 두 시각이 모두 있을 때만 반환합니다.
    pub fn date_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.start_date, self.end_date) {
            (Some(a), Some(b)) if a <= b => Some((a, b)),
            (Some(a), Some(b)) => Some((b, a)),
            _ => None,
        }
    }
}

/// 타임프레임 태그를 관대하게 역직렬화합니다.
///
/// `null`, 단일 문자열, 문자열 배열을 모두 받고 모르는 태그는 버립니다.
fn deserialize_timeframes<'de, D>(deserializer: D) -> Result<Vec<Timeframe>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Value::deserialize(deserializer)? {
        Value::String(tag) => vec![Value::String(tag)],
        Value::Array(tags) => tags,
        _ => Vec::new(),
    };

    let mut timeframes: Vec<Timeframe> = tags
        .iter()
        .filter_map(Value::as_str)
        .filter_map(Timeframe::from_tag)
        .collect();
    timeframes.sort();
    timeframes.dedup();
    Ok(timeframes)
}

/// 추세선 맵. 객체가 아닌 항목은 버립니다.
fn deserialize_trendlines<'de, D>(deserializer: D) -> Result<BTreeMap<String, TrendlineFit>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };

    Ok(entries
        .into_iter()
        .filter(|(_, fit)| fit.is_object())
        .filter_map(|(name, fit)| {
            serde_json::from_value::<TrendlineFit>(fit)
                .ok()
                .map(|fit| (name, fit))
        })
        .collect())
}
