//! ZigZag pivot detection.
//!
//! A three-state machine (no leg, up leg, down leg) walks the bar series once.
//! Thresholds combine a percentage of the reference price (static floor or
//! volatility-scaled) with an ATR floor; reversal confirmation additionally
//! applies the hysteresis multiplier so a leg is harder to break than to
//! establish. Reversals are measured against the running leg extreme, not the
//! current close, so a single wick cannot confirm a pivot on its own.

use tracing::debug;

use crate::config::{Mode, PivotParams};
use crate::detect::volatility;
use crate::models::{Bar, Pivot, PivotKind};

/// Pivots older than the timestamp of bar `n - MAX_BARS` are trimmed away,
/// bounding the cost of downstream classification.
pub const MAX_BARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    None,
    Up,
    Down,
}

/// Detect swing pivots over a full bar series.
///
/// Batch semantics: every call recomputes from scratch; no leg state is
/// carried between invocations. Output for a non-empty series strictly
/// alternates High/Low with strictly increasing `sequence`.
pub fn detect(bars: &[Bar], params: &PivotParams) -> Vec<Pivot> {
    if bars.is_empty() {
        return Vec::new();
    }
    let n = bars.len();

    let (tr, atr) = volatility::true_range_atr(bars, params.atr_length);
    let rvol = volatility::relative_volatility(bars, &tr, params.rvol_window);

    let mut pivots: Vec<Pivot> = Vec::new();
    let mut leg = Leg::None;

    let reference_price = bars[0].close;
    let mut last_pivot_index = 0usize;

    // Pre-establishment running extremes, tracked independently per side so
    // the index always matches the value that actually moved.
    let mut run_high = bars[0].high;
    let mut run_high_idx = 0usize;
    let mut run_low = bars[0].low;
    let mut run_low_idx = 0usize;

    // Current leg extremes; meaningful once a direction is established.
    let mut leg_high = bars[0].high;
    let mut leg_high_idx = 0usize;
    let mut leg_low = bars[0].low;
    let mut leg_low_idx = 0usize;

    for i in 1..n {
        let bar = &bars[i];
        let close = bar.close;
        let high = bar.high;
        let low = bar.low;

        let effective_pct = if params.dynamic_pct_enabled {
            params.vol_mult * rvol[i]
        } else {
            params.pct_min
        };

        match leg {
            Leg::None => {
                let mv = close - reference_price;
                let threshold =
                    (effective_pct * reference_price).max(params.atr_mult * atr[i]);
                if mv.abs() >= threshold {
                    leg = if mv > 0.0 { Leg::Up } else { Leg::Down };
                    leg_high = high;
                    leg_high_idx = i;
                    leg_low = low;
                    leg_low_idx = i;
                    debug!(
                        bar = i,
                        direction = ?leg,
                        run_high,
                        run_high_idx,
                        run_low,
                        run_low_idx,
                        "leg established"
                    );
                } else {
                    if high >= run_high {
                        run_high = high;
                        run_high_idx = i;
                    }
                    if low <= run_low {
                        run_low = low;
                        run_low_idx = i;
                    }
                }
            }
            Leg::Up => {
                if high >= leg_high {
                    leg_high = high;
                    leg_high_idx = i;
                }
                let reversal = leg_high - low;
                let base =
                    (effective_pct * leg_high).max(params.atr_mult * atr[i]);
                let rev_threshold = base * params.hysteresis;
                let spaced = i - last_pivot_index >= params.min_bars_between_pivots;
                if reversal >= rev_threshold && spaced {
                    pivots.push(make_pivot(
                        bars,
                        leg_high_idx,
                        leg_high,
                        PivotKind::High,
                        atr[leg_high_idx],
                    ));
                    last_pivot_index = leg_high_idx;
                    leg = Leg::Down;
                    leg_low = low;
                    leg_low_idx = i;
                }
            }
            Leg::Down => {
                if low <= leg_low {
                    leg_low = low;
                    leg_low_idx = i;
                }
                let reversal = high - leg_low;
                let base = (effective_pct * leg_low.max(1e-9))
                    .max(params.atr_mult * atr[i]);
                let rev_threshold = base * params.hysteresis;
                let spaced = i - last_pivot_index >= params.min_bars_between_pivots;
                if reversal >= rev_threshold && spaced {
                    pivots.push(make_pivot(
                        bars,
                        leg_low_idx,
                        leg_low,
                        PivotKind::Low,
                        atr[leg_low_idx],
                    ));
                    last_pivot_index = leg_low_idx;
                    leg = Leg::Up;
                    leg_high = high;
                    leg_high_idx = i;
                }
            }
        }
    }

    // Backtest runs also report the still-open leg as a synthetic trailing
    // pivot, alternating from the last confirmed one. Live must not, since an
    // unconfirmed leg is not a settled swing.
    if params.mode == Mode::Backtest {
        if let Some(last) = pivots.last() {
            let tail = match last.kind {
                PivotKind::High => {
                    make_pivot(bars, leg_low_idx, leg_low, PivotKind::Low, atr[leg_low_idx])
                }
                PivotKind::Low => make_pivot(
                    bars,
                    leg_high_idx,
                    leg_high,
                    PivotKind::High,
                    atr[leg_high_idx],
                ),
            };
            pivots.push(tail);
        }
    }

    trim_to_window(bars, pivots)
}

/// Drop pivots whose sequence precedes the timestamp of bar `n - MAX_BARS`.
fn trim_to_window(bars: &[Bar], pivots: Vec<Pivot>) -> Vec<Pivot> {
    let cutoff_idx = bars.len().saturating_sub(MAX_BARS);
    let cutoff = bars[cutoff_idx].sequence();
    pivots
        .into_iter()
        .filter(|p| p.sequence >= cutoff)
        .collect()
}

fn make_pivot(bars: &[Bar], idx: usize, value: f64, kind: PivotKind, atr_at_pivot: f64) -> Pivot {
    let bar = &bars[idx];
    Pivot {
        kind,
        timestamp: bar.timestamp,
        sequence: bar.sequence(),
        bar_index: idx,
        value,
        atr_at_pivot,
        retracement_pct: None,
        extension_pct: None,
    }
}
