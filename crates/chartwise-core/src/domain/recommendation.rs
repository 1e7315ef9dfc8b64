//! 종목 추천 레코드.
//!
//! 백엔드의 `GET recommendation` 응답은 필드가 빠지거나 타입이 느슨할 수 있습니다.
//! `RecommendationRecord`가 그대로 받아들이고, `Recommendation::from_record`에서
//! 기본값을 채워 분석 코드에는 항상 완전한 값만 전달합니다.

use super::serde_helpers::{lenient_opt_f64, lenient_opt_string};
use super::signal::{SignalSource, SourceSignal};
use serde::{Deserialize, Serialize};

/// 감성 지수 범위 (-100 ~ 100).
pub const SENTIMENT_RANGE: f64 = 100.0;

/// 백엔드 추천 응답 원본.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub technical_recommendation: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub technical_confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub ml_recommendation: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub ml_confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub sentiment_index: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub candlestick_signal: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub candlestick_confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub chart_pattern_signal: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub chart_pattern_confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub final_recommendation: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub overall_confidence: Option<f64>,
}

/// 기본값이 채워진 추천.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Recommendation {
    /// 기술적 지표 신호
    pub technical: SourceSignal,
    /// ML 예측 신호
    pub ml: SourceSignal,
    /// 감성 지수 (-100 ~ 100, 이미 스케일됨)
    pub sentiment_index: f64,
    /// 캔들스틱 신호
    pub candlestick: SourceSignal,
    /// 차트 패턴 신호
    pub chart_pattern: SourceSignal,
    /// 종합 추천
    pub overall: SourceSignal,
}

impl Recommendation {
    /// 원본 레코드에서 기본값을 채워 생성합니다.
    pub fn from_record(record: &RecommendationRecord) -> Self {
        Self {
            technical: SourceSignal::from_wire(
                record.technical_recommendation.as_deref(),
                record.technical_confidence,
            ),
            ml: SourceSignal::from_wire(record.ml_recommendation.as_deref(), record.ml_confidence),
            sentiment_index: clamp_sentiment(record.sentiment_index.unwrap_or(0.0)),
            candlestick: SourceSignal::from_wire(
                record.candlestick_signal.as_deref(),
                record.candlestick_confidence,
            ),
            chart_pattern: SourceSignal::from_wire(
                record.chart_pattern_signal.as_deref(),
                record.chart_pattern_confidence,
            ),
            overall: SourceSignal::from_wire(
                record.final_recommendation.as_deref(),
                record.overall_confidence,
            ),
        }
    }

    /// 감성 지수를 설정합니다.
    pub fn with_sentiment(mut self, index: f64) -> Self {
        self.sentiment_index = clamp_sentiment(index);
        self
    }

    /// 차트 패턴 신호를 교체합니다 (클라이언트 측 패턴 요약 반영용).
    pub fn with_chart_pattern(mut self, signal: SourceSignal) -> Self {
        self.chart_pattern = signal;
        self
    }

    /// 출처별 신호/신뢰도 쌍. 감성은 신호 쌍이 없으므로 `None`.
    pub fn source(&self, source: SignalSource) -> Option<&SourceSignal> {
        match source {
            SignalSource::Technical => Some(&self.technical),
            SignalSource::Ml => Some(&self.ml),
            SignalSource::Sentiment => None,
            SignalSource::Candlestick => Some(&self.candlestick),
            SignalSource::ChartPattern => Some(&self.chart_pattern),
            SignalSource::Overall => Some(&self.overall),
        }
    }
}

impl From<RecommendationRecord> for Recommendation {
    fn from(record: RecommendationRecord) -> Self {
        Self::from_record(&record)
    }
}

fn clamp_sentiment(index: f64) -> f64 {
    if index.is_nan() {
        0.0
    } else {
        index.clamp(-SENTIMENT_RANGE, SENTIMENT_RANGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeSignal;

    #[test]
    fn test_from_partial_record() {
        let raw = serde_json::json!({
            "technical_recommendation": "BUY",
            "technical_confidence": 0.8,
            "sentiment_index": 140.0,
            "final_recommendation": "Strong Sell"
        });
        let record: RecommendationRecord = serde_json::from_value(raw).unwrap();
        let rec = Recommendation::from_record(&record);

        assert_eq!(rec.technical, SourceSignal::new(TradeSignal::Buy, 0.8));
        assert_eq!(rec.ml.signal, None);
        assert_eq!(rec.ml.label(), "N/A");
        assert_eq!(rec.sentiment_index, 100.0);
        assert_eq!(rec.overall.signal, Some(TradeSignal::Sell));
        assert_eq!(rec.overall.confidence, 0.0);
    }

    #[test]
    fn test_loosely_typed_record_is_accepted() {
        let raw = serde_json::json!({
            "technical_recommendation": "BUY",
            "technical_confidence": "0.8",
            "ml_recommendation": null,
            "ml_confidence": "high",
            "sentiment_index": "-35",
            "candlestick_signal": ["SELL"],
            "overall_confidence": null
        });
        let record: RecommendationRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.technical_confidence, Some(0.8));
        assert_eq!(record.ml_confidence, None);
        assert_eq!(record.candlestick_signal, None);

        let rec = Recommendation::from_record(&record);
        assert_eq!(rec.technical, SourceSignal::new(TradeSignal::Buy, 0.8));
        assert_eq!(rec.ml.signal, None);
        assert_eq!(rec.sentiment_index, -35.0);
        assert_eq!(rec.candlestick.signal, None);
        assert_eq!(rec.overall.confidence, 0.0);
    }

    #[test]
    fn test_source_lookup() {
        let rec = Recommendation::default()
            .with_chart_pattern(SourceSignal::new(TradeSignal::Buy, 0.6));
        assert_eq!(
            rec.source(SignalSource::ChartPattern).and_then(|s| s.signal),
            Some(TradeSignal::Buy)
        );
        assert!(rec.source(SignalSource::Sentiment).is_none());
    }
}
