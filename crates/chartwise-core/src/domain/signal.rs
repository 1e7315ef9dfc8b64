//! 소스별 매매 신호.
//!
//! 이 모듈은 추천 레코드를 구성하는 신호 타입을 정의합니다:
//! - `TradeSignal` - BUY / SELL / HOLD
//! - `SignalSource` - 신호 출처 (기술적, ML, 감성, 캔들스틱, 차트 패턴, 종합)
//! - `SourceSignal` - 신호와 신뢰도 한 쌍

use serde::{Deserialize, Serialize};
use std::fmt;

/// 방향성 매매 신호.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSignal {
    /// 매수
    Buy,
    /// 매도
    Sell,
    /// 관망
    Hold,
}

impl TradeSignal {
    /// 백엔드 문자열을 관대하게 파싱합니다.
    ///
    /// "Strong Buy", "buy", "BUY" 는 모두 매수로 봅니다. 알 수 없는 값은 `None`.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.is_empty() || normalized == "N/A" {
            return None;
        }
        if normalized.ends_with("BUY") || normalized == "BULLISH" {
            Some(TradeSignal::Buy)
        } else if normalized.ends_with("SELL") || normalized == "BEARISH" {
            Some(TradeSignal::Sell)
        } else if normalized == "HOLD" || normalized == "NEUTRAL" {
            Some(TradeSignal::Hold)
        } else {
            None
        }
    }
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSignal::Buy => write!(f, "BUY"),
            TradeSignal::Sell => write!(f, "SELL"),
            TradeSignal::Hold => write!(f, "HOLD"),
        }
    }
}

/// 레이더 차트의 축이 되는 신호 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// 기술적 지표
    Technical,
    /// ML 예측
    Ml,
    /// 뉴스 감성 지수
    Sentiment,
    /// 캔들스틱 패턴
    Candlestick,
    /// 차트 패턴
    ChartPattern,
    /// 종합 추천
    Overall,
}

impl SignalSource {
    /// 레이더 축 순서.
    pub const ALL: [SignalSource; 6] = [
        SignalSource::Technical,
        SignalSource::Ml,
        SignalSource::Sentiment,
        SignalSource::Candlestick,
        SignalSource::ChartPattern,
        SignalSource::Overall,
    ];

    /// 화면 표시용 이름.
    pub fn label(&self) -> &'static str {
        match self {
            SignalSource::Technical => "Technical",
            SignalSource::Ml => "ML",
            SignalSource::Sentiment => "Sentiment",
            SignalSource::Candlestick => "Candlestick",
            SignalSource::ChartPattern => "Chart Pattern",
            SignalSource::Overall => "Overall",
        }
    }

    /// 신호/신뢰도 쌍 대신 연속 지수를 제공하는 출처인지 확인합니다.
    pub fn is_index(&self) -> bool {
        matches!(self, SignalSource::Sentiment)
    }
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 한 출처의 신호와 신뢰도.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceSignal {
    /// 신호 (없으면 관망과 같이 0점 처리, 화면에는 "N/A")
    pub signal: Option<TradeSignal>,
    /// 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
}

impl SourceSignal {
    /// 새 신호를 생성합니다. 신뢰도는 [0, 1]로 제한됩니다.
    pub fn new(signal: TradeSignal, confidence: f64) -> Self {
        Self {
            signal: Some(signal),
            confidence: clamp_unit(confidence),
        }
    }

    /// 신호가 없는 출처.
    pub fn absent() -> Self {
        Self::default()
    }

    /// 와이어 값에서 생성합니다. 누락 필드는 기본값으로 채웁니다.
    pub fn from_wire(signal: Option<&str>, confidence: Option<f64>) -> Self {
        Self {
            signal: signal.and_then(TradeSignal::parse_lenient),
            confidence: confidence.map(clamp_unit).unwrap_or(0.0),
        }
    }

    /// 화면 표시 문자열 ("BUY", "SELL", "HOLD", "N/A").
    pub fn label(&self) -> String {
        self.signal
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// NaN은 0으로, 나머지는 [0, 1]로 제한합니다.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient() {
        assert_eq!(TradeSignal::parse_lenient("BUY"), Some(TradeSignal::Buy));
        assert_eq!(TradeSignal::parse_lenient(" strong buy "), Some(TradeSignal::Buy));
        assert_eq!(TradeSignal::parse_lenient("Strong Sell"), Some(TradeSignal::Sell));
        assert_eq!(TradeSignal::parse_lenient("hold"), Some(TradeSignal::Hold));
        assert_eq!(TradeSignal::parse_lenient("N/A"), None);
        assert_eq!(TradeSignal::parse_lenient("maybe"), None);
    }

    #[test]
    fn test_source_signal_from_wire_defaults() {
        let missing = SourceSignal::from_wire(None, None);
        assert_eq!(missing.signal, None);
        assert_eq!(missing.confidence, 0.0);
        assert_eq!(missing.label(), "N/A");

        let clamped = SourceSignal::from_wire(Some("SELL"), Some(1.7));
        assert_eq!(clamped.signal, Some(TradeSignal::Sell));
        assert_eq!(clamped.confidence, 1.0);

        let nan = SourceSignal::from_wire(Some("BUY"), Some(f64::NAN));
        assert_eq!(nan.confidence, 0.0);
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(SignalSource::Ml.label(), "ML");
        assert_eq!(SignalSource::ChartPattern.to_string(), "Chart Pattern");
        assert!(SignalSource::Sentiment.is_index());
        assert!(!SignalSource::Overall.is_index());
    }
}
