//! 터미널 출력 형식.

use chartwise_analytics::{ConfirmedPattern, RadarModel};
use chartwise_core::{DetectSummary, SignalSource};
use chartwise_client::ViewSnapshot;
use std::collections::BTreeSet;

/// 확인 패턴 테이블.
pub fn format_patterns(patterns: &[ConfirmedPattern], visible: Option<&BTreeSet<i64>>) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<6} {:<26} {:<8} {:<12} {:>6} {:<12} {:>5} {:>6} {:<4}\n",
        "ID", "PATTERN", "SIGNAL", "BARS", "CONF", "TIMEFRAMES", "LEVEL", "ALIGN", "SHOW"
    ));
    output.push_str(&"-".repeat(94));
    output.push('\n');

    for c in patterns {
        let (start, end) = c.pattern.index_span();
        let timeframes = c
            .timeframes()
            .iter()
            .map(|tf| tf.as_tag())
            .collect::<Vec<_>>()
            .join(",");
        let align = c
            .alignment_score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "-".to_string());
        let shown = match visible {
            Some(set) if !set.contains(&c.pattern.id) => "✗",
            _ => "✓",
        };

        output.push_str(&format!(
            "{:<6} {:<26} {:<8} {:<12} {:>5.0}% {:<12} {:>5} {:>6} {:<4}\n",
            c.pattern.id,
            truncate(&c.pattern.pattern_name, 26),
            c.pattern.signal,
            format!("{}-{}", start, end),
            c.base_confidence * 100.0,
            timeframes,
            c.confirmation_level,
            align,
            shown
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "Total: {} patterns ({} multi-timeframe)",
        patterns.len(),
        patterns.iter().filter(|c| c.is_multi_timeframe()).count()
    ));
    output
}

/// 감지 요약 한 줄.
pub fn format_summary(summary: &DetectSummary) -> String {
    format!(
        "패턴 {}개 (반전 {}, 지속 {}) | 상승 {} / 하락 {} / 중립 {}",
        summary.total_patterns,
        summary.reversal_patterns,
        summary.continuation_patterns,
        summary.bullish_count,
        summary.bearish_count,
        summary.neutral_count
    )
}

/// 레이더 모델. 없으면 "데이터 없음".
pub fn format_radar(radar: Option<&RadarModel>) -> String {
    let Some(model) = radar else {
        return "추천 데이터 없음 (no data yet)".to_string();
    };

    let mut output = String::new();
    output.push_str(&format!(
        "{:<14} {:>8} {:>10}  {}\n",
        "FACTOR", "SCORE", "NORMALIZED", "ZONE"
    ));
    output.push_str(&"-".repeat(48));
    output.push('\n');

    for factor in SignalSource::ALL {
        let point = model.point(factor);
        output.push_str(&format!(
            "{:<14} {:>8.1} {:>10.1}  {:?}\n",
            factor.label(),
            point.score,
            point.normalized,
            model.zone(factor)
        ));
    }

    output.push_str(&format!(
        "\nThresholds: buy {:.0} / hold {:.0} / sell {:.0}",
        model.thresholds.buy, model.thresholds.hold, model.thresholds.sell
    ));
    output
}

/// 종목 상세 화면 전체.
pub fn format_snapshot(snapshot: &ViewSnapshot) -> String {
    let mut output = format!("종목 {} [{}]\n\n", snapshot.stock_id, snapshot.state);

    if let Some(error) = &snapshot.last_error {
        output.push_str(&format!("⚠ {}\n\n", error));
    }
    if let Some(summary) = &snapshot.summary {
        output.push_str(&format_summary(summary));
        output.push_str("\n\n");
    }

    if snapshot.patterns.is_empty() {
        output.push_str("감지된 패턴 없음 (no data yet)\n");
    } else {
        output.push_str(&format_patterns(&snapshot.patterns, Some(&snapshot.visible)));
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&format_radar(snapshot.radar.as_ref()));
    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
