//! 소스별 신호를 레이더 차트 모델로 집계합니다.
//!
//! 방향성 소스는 `신뢰도 × 100`에 방향 부호를 곱한 점수로 바뀝니다.
//! 매수와 매도가 거울상이 되고 관망은 중심(0)에 놓이므로, 성격이 다른
//! 소스들을 하나의 반경 축에 함께 그릴 수 있습니다.
//!
//! 극좌표 반경은 음수가 될 수 없으므로 모든 점수에 100을 더해
//! [0, 200] 구간으로 옮깁니다 (`normalized`).
//!
//! # 사용 예시
//!
//! ```rust
//! use chartwise_analytics::radar::aggregate;
//! use chartwise_core::{Recommendation, SourceSignal, TradeSignal};
//!
//! let rec = Recommendation::default()
//!     .with_chart_pattern(SourceSignal::new(TradeSignal::Buy, 0.6));
//! let model = aggregate(Some(&rec)).expect("추천이 있으면 모델이 생성됨");
//! assert_eq!(model.points.len(), 6);
//!
//! // 추천이 없으면 중립 레이더 대신 "데이터 없음"
//! assert!(aggregate(None).is_none());
//! ```

use chartwise_core::{Recommendation, SignalSource, SourceSignal, TradeSignal, SENTIMENT_RANGE};
use serde::{Deserialize, Serialize};

/// 점수를 레이더 반경으로 옮기는 오프셋.
pub const RADAR_OFFSET: f64 = 100.0;

/// 모든 축이 공유하는 반경 도메인.
pub const RADAR_DOMAIN: (f64, f64) = (0.0, 2.0 * RADAR_OFFSET);

/// 비교용 기준 링 (이동된 [0, 200] 스케일).
///
/// 데이터에서 계산하지 않는 고정값입니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionThresholds {
    /// 매수 기준 (원래 스케일 +70)
    pub buy: f64,
    /// 관망 기준 (원래 스케일 0)
    pub hold: f64,
    /// 매도 기준 (원래 스케일 -70)
    pub sell: f64,
}

impl DecisionThresholds {
    /// 표준 기준값.
    pub const STANDARD: DecisionThresholds = DecisionThresholds {
        buy: 170.0,
        hold: 100.0,
        sell: 30.0,
    };

    /// 원래 [-100, 100] 스케일의 기준값 `(buy, hold, sell)`.
    pub fn native(&self) -> (f64, f64, f64) {
        (
            self.buy - RADAR_OFFSET,
            self.hold - RADAR_OFFSET,
            self.sell - RADAR_OFFSET,
        )
    }
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// 기준 링 대비 위치.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdZone {
    /// 매수 링 이상
    AboveBuy,
    /// 매수/매도 링 사이
    Neutral,
    /// 매도 링 이하
    BelowSell,
}

/// 레이더 축 하나.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarPoint {
    /// 신호 출처
    pub factor: SignalSource,
    /// 원래 점수 (-100 ~ 100)
    pub score: f64,
    /// 이동된 점수 (0 ~ 200)
    pub normalized: f64,
}

impl RadarPoint {
    /// 점수로부터 축을 생성합니다. 점수는 [-100, 100]으로 제한됩니다.
    pub fn new(factor: SignalSource, score: f64) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(-SENTIMENT_RANGE, SENTIMENT_RANGE)
        };
        // -0.0 대신 0.0
        let score = if score == 0.0 { 0.0 } else { score };
        Self {
            factor,
            score,
            normalized: score + RADAR_OFFSET,
        }
    }
}

/// 레이더 차트 모델.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarModel {
    /// `SignalSource::ALL` 순서의 축
    pub points: [RadarPoint; 6],
    /// 기준 링
    pub thresholds: DecisionThresholds,
}

impl RadarModel {
    /// 특정 출처의 축을 반환합니다.
    pub fn point(&self, factor: SignalSource) -> &RadarPoint {
        // points는 항상 SignalSource::ALL 순서로 채워짐
        &self.points[factor_position(factor)]
    }

    /// 특정 출처가 기준 링 대비 어디에 있는지 분류합니다.
    pub fn zone(&self, factor: SignalSource) -> ThresholdZone {
        let normalized = self.point(factor).normalized;
        if normalized >= self.thresholds.buy {
            ThresholdZone::AboveBuy
        } else if normalized <= self.thresholds.sell {
            ThresholdZone::BelowSell
        } else {
            ThresholdZone::Neutral
        }
    }
}

/// 추천 → 레이더 모델 집계기.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalAggregator {
    thresholds: DecisionThresholds,
}

impl SignalAggregator {
    /// 표준 기준값으로 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 추천을 레이더 모델로 집계합니다.
    ///
    /// 추천이 없으면 `None`을 반환합니다. 0점으로 채운 중립 레이더는
    /// 실제 중립 신호로 오해될 수 있으므로 만들지 않습니다.
    pub fn aggregate(&self, recommendation: Option<&Recommendation>) -> Option<RadarModel> {
        let rec = recommendation?;

        let points = SignalSource::ALL.map(|factor| {
            let score = match rec.source(factor) {
                Some(signal) => directional_score(signal),
                None => rec.sentiment_index,
            };
            RadarPoint::new(factor, score)
        });

        tracing::trace!(
            overall = points[factor_position(SignalSource::Overall)].score,
            "Radar aggregated"
        );

        Some(RadarModel {
            points,
            thresholds: self.thresholds,
        })
    }
}

/// 표준 집계기로 추천을 집계합니다.
pub fn aggregate(recommendation: Option<&Recommendation>) -> Option<RadarModel> {
    SignalAggregator::new().aggregate(recommendation)
}

/// 방향성 소스 점수: 매수 `c×100`, 매도 `-c×100`, 관망/없음 0.
pub fn directional_score(signal: &SourceSignal) -> f64 {
    let confidence = chartwise_core::clamp_unit(signal.confidence);
    match signal.signal {
        Some(TradeSignal::Buy) => confidence * 100.0,
        Some(TradeSignal::Sell) => -confidence * 100.0,
        Some(TradeSignal::Hold) | None => 0.0,
    }
}

fn factor_position(factor: SignalSource) -> usize {
    SignalSource::ALL
        .iter()
        .position(|f| *f == factor)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn sample() -> Recommendation {
        Recommendation {
            technical: SourceSignal::new(TradeSignal::Buy, 0.8),
            ml: SourceSignal::new(TradeSignal::Sell, 0.4),
            sentiment_index: 25.0,
            candlestick: SourceSignal::new(TradeSignal::Hold, 0.0),
            chart_pattern: SourceSignal::new(TradeSignal::Buy, 0.6),
            overall: SourceSignal::new(TradeSignal::Buy, 0.7),
        }
    }

    #[test]
    fn test_reference_recommendation() {
        let model = aggregate(Some(&sample())).unwrap();
        let expected = [
            (SignalSource::Technical, 80.0, 180.0),
            (SignalSource::Ml, -40.0, 60.0),
            (SignalSource::Sentiment, 25.0, 125.0),
            (SignalSource::Candlestick, 0.0, 100.0),
            (SignalSource::ChartPattern, 60.0, 160.0),
            (SignalSource::Overall, 70.0, 170.0),
        ];

        for (point, (factor, score, normalized)) in model.points.iter().zip(expected) {
            assert_eq!(point.factor, factor);
            assert!(approx(point.score, score), "{factor}: {}", point.score);
            assert!(approx(point.normalized, normalized));
        }
        assert_eq!(model.thresholds, DecisionThresholds::STANDARD);
    }

    #[test]
    fn test_no_recommendation_is_no_data() {
        assert!(aggregate(None).is_none());
    }

    #[test]
    fn test_hold_and_absent_are_zero() {
        assert_eq!(directional_score(&SourceSignal::new(TradeSignal::Hold, 0.9)), 0.0);
        assert_eq!(directional_score(&SourceSignal::absent()), 0.0);
        let sell_zero = directional_score(&SourceSignal::new(TradeSignal::Sell, 0.0));
        assert_eq!(RadarPoint::new(SignalSource::Ml, sell_zero).score.to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn test_thresholds_native_scale() {
        let (buy, hold, sell) = DecisionThresholds::STANDARD.native();
        assert!(approx(buy, 70.0));
        assert!(approx(hold, 0.0));
        assert!(approx(sell, -70.0));
    }

    #[test]
    fn test_zones() {
        let model = aggregate(Some(&sample())).unwrap();
        assert_eq!(model.zone(SignalSource::Technical), ThresholdZone::AboveBuy);
        assert_eq!(model.zone(SignalSource::Overall), ThresholdZone::AboveBuy);
        assert_eq!(model.zone(SignalSource::Ml), ThresholdZone::Neutral);

        let bearish = Recommendation {
            overall: SourceSignal::new(TradeSignal::Sell, 0.9),
            ..Default::default()
        };
        let model = aggregate(Some(&bearish)).unwrap();
        assert_eq!(model.zone(SignalSource::Overall), ThresholdZone::BelowSell);
    }

    #[test]
    fn test_sentiment_bypasses_signal_mapping() {
        let rec = Recommendation::default().with_sentiment(-85.5);
        let model = aggregate(Some(&rec)).unwrap();
        let point = model.point(SignalSource::Sentiment);
        assert!(approx(point.score, -85.5));
        assert!(approx(point.normalized, 14.5));
    }
}
