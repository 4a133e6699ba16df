//! # Analytics Aggregator
//! Pure, testable logic that maps the current signal collection to an
//! `AnalyticsSnapshot`. No I/O, no incremental state; everything is
//! recomputed per call, which is fine at the intended scale.
//!
//! Division semantics are the sensitive part: averaged fields are absent
//! (not zero) when no signal qualifies, the TP/SL ratio sample admits a
//! signal only when its stop distance is strictly positive, and the
//! buy/sell ratio falls back to the raw buy count when there are no sells.

use indexmap::IndexMap;
use serde::Serialize;

use crate::signal::{Action, Signal};

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub total_symbols: usize,
    pub total_groups: usize,
    pub signals_per_day: f64,
    /// buy/sell when sells exist; otherwise the raw buy count. Callers must
    /// treat the meaning as context-dependent at that boundary.
    pub buy_sell_ratio: f64,
    pub avg_risk_reward: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub total_signals: usize,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub avg_confidence: Option<f64>,
    pub avg_quality_score: Option<f64>,
    pub avg_tp_sl_ratio: Option<f64>,
    pub symbols_breakdown: IndexMap<String, u64>,
    pub groups_breakdown: IndexMap<String, u64>,
    pub sentiment_breakdown: IndexMap<String, u64>,
    /// Calendar date (YYYY-MM-DD) -> count. Signals whose timestamp does not
    /// parse are skipped from this breakdown only.
    pub daily_breakdown: IndexMap<String, u64>,
    pub performance_metrics: PerformanceMetrics,
}

/// Compute the full snapshot. Pure function of its input; an empty
/// collection yields zero counts, empty breakdowns, and absent averages.
pub fn compute(signals: &[Signal]) -> AnalyticsSnapshot {
    let total_signals = signals.len();
    let buy_signals = signals.iter().filter(|s| s.action == Action::Buy).count();
    let sell_signals = signals.iter().filter(|s| s.action == Action::Sell).count();

    let avg_confidence = mean(signals.iter().filter_map(|s| s.confidence));
    let avg_quality_score = mean(signals.iter().filter_map(|s| s.quality_score));
    let avg_tp_sl_ratio = mean(signals.iter().filter_map(tp_sl_ratio));

    let mut symbols_breakdown: IndexMap<String, u64> = IndexMap::new();
    let mut groups_breakdown: IndexMap<String, u64> = IndexMap::new();
    let mut sentiment_breakdown: IndexMap<String, u64> = IndexMap::new();
    let mut daily_breakdown: IndexMap<String, u64> = IndexMap::new();

    for s in signals {
        *symbols_breakdown.entry(s.symbol.clone()).or_insert(0) += 1;

        let group = s.group_name.as_deref().unwrap_or("Unknown");
        *groups_breakdown.entry(group.to_string()).or_insert(0) += 1;

        let sentiment = s.sentiment.map(|v| v.as_str()).unwrap_or("UNKNOWN");
        *sentiment_breakdown.entry(sentiment.to_string()).or_insert(0) += 1;

        if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(&s.timestamp) {
            let day = ts.date_naive().format("%Y-%m-%d").to_string();
            *daily_breakdown.entry(day).or_insert(0) += 1;
        }
    }

    let days_seen = daily_breakdown.len().max(1);
    let buy_sell_ratio = if sell_signals > 0 {
        buy_signals as f64 / sell_signals as f64
    } else {
        buy_signals as f64
    };

    let performance_metrics = PerformanceMetrics {
        total_symbols: symbols_breakdown.len(),
        total_groups: groups_breakdown.len(),
        signals_per_day: total_signals as f64 / days_seen as f64,
        buy_sell_ratio,
        avg_risk_reward: mean(signals.iter().filter_map(|s| s.risk_reward_ratio)),
    };

    AnalyticsSnapshot {
        total_signals,
        buy_signals,
        sell_signals,
        avg_confidence,
        avg_quality_score,
        avg_tp_sl_ratio,
        symbols_breakdown,
        groups_breakdown,
        sentiment_breakdown,
        daily_breakdown,
        performance_metrics,
    }
}

/// Directional TP/SL ratio for one signal. Requires entry, tp1, and sl, and
/// a strictly positive stop distance; a zero or negative stop distance
/// excludes the signal from the sample instead of erroring.
fn tp_sl_ratio(s: &Signal) -> Option<f64> {
    let entry = s.entry?;
    let tp1 = s.tp1?;
    let sl = s.sl?;
    let (tp_distance, sl_distance) = match s.action {
        Action::Buy => (tp1 - entry, entry - sl),
        Action::Sell => (entry - tp1, sl - entry),
    };
    if sl_distance > 0.0 {
        Some(tp_distance / sl_distance)
    } else {
        None
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n > 0 {
        Some(sum / n as f64)
    } else {
        None
    }
}
