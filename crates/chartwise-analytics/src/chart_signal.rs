//! 확인된 패턴 목록을 차트 패턴 신호로 요약합니다.
//!
//! 레이더의 "Chart Pattern" 축은 백엔드 추천 대신 화면에 실제로 보이는
//! 확인 패턴으로부터 계산됩니다. 여러 타임프레임에서 확인된 패턴일수록
//! 가중치가 커집니다.

use crate::confirmation::ConfirmedPattern;
use chartwise_core::{clamp_unit, PatternSignal, SourceSignal, TradeSignal};
use serde::{Deserialize, Serialize};

/// 확인 수준에 따른 신뢰도 가중 정책.
///
/// `boosted = min(1, c × (1 + step × (level − 1)))`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationBoost {
    /// 타임프레임 하나가 늘 때마다 더해지는 배율
    pub step: f64,
}

impl ConfirmationBoost {
    /// 기본 배율 (타임프레임당 10%).
    pub const DEFAULT_STEP: f64 = 0.1;

    /// 새 정책을 생성합니다. 음수 배율은 0으로 처리합니다.
    pub fn new(step: f64) -> Self {
        Self {
            step: if step.is_nan() { 0.0 } else { step.max(0.0) },
        }
    }

    /// 가중된 신뢰도. 확인 수준 1이면 원래 신뢰도와 같습니다.
    pub fn apply(&self, confidence: f64, confirmation_level: usize) -> f64 {
        let extra = confirmation_level.saturating_sub(1) as f64;
        (clamp_unit(confidence) * (1.0 + self.step * extra)).min(1.0)
    }

    /// 확인 패턴의 가중 신뢰도.
    pub fn boosted(&self, pattern: &ConfirmedPattern) -> f64 {
        self.apply(pattern.base_confidence, pattern.confirmation_level)
    }
}

impl Default for ConfirmationBoost {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP)
    }
}

/// 확인 패턴 목록을 하나의 매매 신호로 요약합니다.
///
/// 상승 가중치 합이 크면 매수, 하락 가중치 합이 크면 매도, 같으면 관망입니다.
/// 신뢰도는 `|B − S| / n`이며 `n`은 방향성 패턴 수입니다.
/// 중립 패턴은 계산에 들어가지 않습니다.
pub fn chart_pattern_signal(patterns: &[ConfirmedPattern], boost: &ConfirmationBoost) -> SourceSignal {
    let (bullish, bearish, count) =
        patterns
            .iter()
            .fold((0.0_f64, 0.0_f64, 0usize), |(b, s, n), p| match p.pattern.signal {
                PatternSignal::Bullish => (b + boost.boosted(p), s, n + 1),
                PatternSignal::Bearish => (b, s + boost.boosted(p), n + 1),
                PatternSignal::Neutral => (b, s, n),
            });

    let signal = if bullish > bearish {
        TradeSignal::Buy
    } else if bearish > bullish {
        TradeSignal::Sell
    } else {
        TradeSignal::Hold
    };
    let confidence = if count == 0 {
        0.0
    } else {
        (bullish - bearish).abs() / count as f64
    };

    tracing::trace!(bullish, bearish, count, %signal, "Chart pattern signal computed");
    SourceSignal::new(signal, confidence)
}
