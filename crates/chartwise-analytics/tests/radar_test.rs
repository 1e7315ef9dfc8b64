//! 레이더 집계 테스트.
//!
//! 와이어 레코드 → 추천 → 레이더 모델 전체 경로와 집계 속성을 검증합니다.

use chartwise_analytics::radar::{aggregate, DecisionThresholds, RADAR_DOMAIN};
use chartwise_core::{
    Recommendation, RecommendationRecord, SignalSource, SourceSignal, TradeSignal,
};
use proptest::prelude::*;

// ================================================================================================
// 와이어 레코드 경로
// ================================================================================================

#[test]
fn test_wire_record_to_radar() {
    let record: RecommendationRecord = serde_json::from_str(
        r#"{
            "technical_recommendation": "BUY",
            "technical_confidence": 0.8,
            "ml_recommendation": "SELL",
            "ml_confidence": 0.4,
            "sentiment_index": 25,
            "candlestick_signal": "HOLD",
            "candlestick_confidence": 0.0,
            "chart_pattern_signal": "BUY",
            "chart_pattern_confidence": 0.6,
            "final_recommendation": "BUY",
            "overall_confidence": 0.7
        }"#,
    )
    .unwrap();

    let model = aggregate(Some(&Recommendation::from(record))).unwrap();
    let normalized: Vec<f64> = model.points.iter().map(|p| p.normalized).collect();
    let expected = [180.0, 60.0, 125.0, 100.0, 160.0, 170.0];

    for (actual, expected) in normalized.iter().zip(expected) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }
    assert_eq!(model.thresholds, DecisionThresholds::STANDARD);
}

#[test]
fn test_malformed_record_defaults() {
    let record: RecommendationRecord = serde_json::from_str(
        r#"{
            "technical_recommendation": "???",
            "ml_recommendation": "BUY",
            "sentiment_index": 250
        }"#,
    )
    .unwrap();

    let model = aggregate(Some(&Recommendation::from(record))).unwrap();
    assert_eq!(model.point(SignalSource::Technical).score, 0.0);
    // 신뢰도 없음 → 0
    assert_eq!(model.point(SignalSource::Ml).score, 0.0);
    assert_eq!(model.point(SignalSource::Sentiment).normalized, 200.0);
}

#[test]
fn test_chart_pattern_replacement() {
    let rec = Recommendation {
        chart_pattern: SourceSignal::new(TradeSignal::Buy, 0.9),
        ..Default::default()
    }
    .with_chart_pattern(SourceSignal::new(TradeSignal::Sell, 0.25));

    let model = aggregate(Some(&rec)).unwrap();
    assert!((model.point(SignalSource::ChartPattern).score + 25.0).abs() < 1e-9);
}

// ================================================================================================
// 속성 테스트
// ================================================================================================

fn signal_strategy() -> impl Strategy<Value = SourceSignal> {
    (
        prop_oneof![
            Just(None),
            Just(Some(TradeSignal::Buy)),
            Just(Some(TradeSignal::Sell)),
            Just(Some(TradeSignal::Hold)),
        ],
        0.0f64..=1.0,
    )
        .prop_map(|(signal, confidence)| SourceSignal { signal, confidence })
}

fn recommendation_strategy() -> impl Strategy<Value = Recommendation> {
    (
        signal_strategy(),
        signal_strategy(),
        -100.0f64..=100.0,
        signal_strategy(),
        signal_strategy(),
        signal_strategy(),
    )
        .prop_map(
            |(technical, ml, sentiment_index, candlestick, chart_pattern, overall)| Recommendation {
                technical,
                ml,
                sentiment_index,
                candlestick,
                chart_pattern,
                overall,
            },
        )
}

proptest! {
    #[test]
    fn prop_aggregation_is_idempotent(rec in recommendation_strategy()) {
        prop_assert_eq!(aggregate(Some(&rec)), aggregate(Some(&rec)));
    }

    #[test]
    fn prop_normalized_stays_in_domain(rec in recommendation_strategy()) {
        let model = aggregate(Some(&rec)).unwrap();
        for point in model.points {
            prop_assert!(point.normalized >= RADAR_DOMAIN.0 && point.normalized <= RADAR_DOMAIN.1);
            prop_assert!((point.normalized - point.score - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_sign_and_magnitude(signal in signal_strategy()) {
        let rec = Recommendation { technical: signal, ..Default::default() };
        let score = aggregate(Some(&rec)).unwrap().point(SignalSource::Technical).score;
        match signal.signal {
            Some(TradeSignal::Buy) => {
                prop_assert!(score >= 0.0);
                prop_assert!((score - signal.confidence * 100.0).abs() < 1e-9);
            }
            Some(TradeSignal::Sell) => {
                prop_assert!(score <= 0.0);
                prop_assert!((score + signal.confidence * 100.0).abs() < 1e-9);
            }
            _ => prop_assert_eq!(score, 0.0),
        }
    }
}
