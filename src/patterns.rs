//! Pattern classification over a detected pivot sequence.
//!
//! Fits two-point boundary lines through the most recent swing highs and lows,
//! classifies the triangle/wedge shape they form, and independently derives
//! reversal support/resistance helper lines. A two-point fit keeps the lines
//! responsive to the latest structure; slope sign and gap contraction are what
//! the classification keys on.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClassifierConfig;
use crate::models::{BoundaryLine, LineSide, PatternType, Pivot};

/// Confidence assigned to a plain two-point boundary fit.
const BOUNDARY_CONFIDENCE: f64 = 0.6;
/// Confidence assigned to reversal support/resistance helper lines.
const REVERSAL_CONFIDENCE: f64 = 0.65;

/// Classify patterns from a pivot sequence.
///
/// Returns an empty list for fewer than 4 pivots, and also on any internal
/// failure: callers cannot distinguish "no pattern" from "classification
/// errored"; the warn-level log is the only diagnostic channel.
pub fn classify(pivots: &[Pivot], config: &ClassifierConfig) -> Vec<BoundaryLine> {
    match classify_inner(pivots, config) {
        Ok(lines) => lines,
        Err(e) => {
            warn!("pattern classification failed: {e:#}");
            Vec::new()
        }
    }
}

fn classify_inner(
    pivots: &[Pivot],
    config: &ClassifierConfig,
) -> anyhow::Result<Vec<BoundaryLine>> {
    if pivots.len() < 4 {
        return Ok(Vec::new());
    }

    // Work with the last K pivots for responsiveness
    let k = config.recent_pivot_count.min(pivots.len());
    let recent = &pivots[pivots.len() - k..];

    let highs: Vec<&Pivot> = recent.iter().filter(|p| p.is_high()).collect();
    let lows: Vec<&Pivot> = recent.iter().filter(|p| p.is_low()).collect();

    let mut out = Vec::new();

    // 1) Triangle / wedge from the last two highs and last two lows
    let upper = fit_boundary(&highs, LineSide::Upper);
    let lower = fit_boundary(&lows, LineSide::Lower);

    if let (Some(mut upper), Some(mut lower)) = (upper, lower) {
        let gap_at = |idx: usize| (upper.value_at(idx) - lower.value_at(idx)).abs();
        let gap_start = gap_at(upper.start_idx.min(lower.start_idx));
        let gap_end = gap_at(upper.end_idx.max(lower.end_idx));
        let contracting = gap_end < gap_start;

        let up = upper.slope_per_bar;
        let lo = lower.slope_per_bar;
        let pattern = if up < 0.0 && lo > 0.0 && contracting {
            PatternType::TriangleContracting
        } else if up > 0.0 && lo < 0.0 && !contracting {
            PatternType::TriangleExpanding
        } else if up > 0.0 && lo > 0.0 {
            PatternType::WedgeAscending
        } else if up < 0.0 && lo < 0.0 {
            PatternType::WedgeDescending
        } else if contracting {
            PatternType::TriangleContracting
        } else {
            PatternType::TriangleExpanding
        };

        debug!(?pattern, gap_start, gap_end, "triangle/wedge candidate");

        let gid = Uuid::new_v4().to_string();
        upper.group_id = gid.clone();
        lower.group_id = gid;
        upper.pattern = Some(pattern);
        lower.pattern = Some(pattern);
        out.push(upper);
        out.push(lower);
    }

    // 2) Reversal helper lines across recent lower-highs / higher-lows
    out.extend(reversal_lines(&highs, &lows));

    Ok(out)
}

/// Two-point fit through the last two pivots of one side.
///
/// Degenerate geometry (fewer than two points, equal bar indices) yields no
/// line rather than an error.
fn fit_boundary(side_pivots: &[&Pivot], side: LineSide) -> Option<BoundaryLine> {
    if side_pivots.len() < 2 {
        return None;
    }
    let p1 = side_pivots[side_pivots.len() - 2];
    let p2 = side_pivots[side_pivots.len() - 1];
    fit_line(p1, p2, side, None, BOUNDARY_CONFIDENCE)
}

fn fit_line(
    p1: &Pivot,
    p2: &Pivot,
    side: LineSide,
    pattern: Option<PatternType>,
    confidence: f64,
) -> Option<BoundaryLine> {
    if p1.bar_index == p2.bar_index {
        return None;
    }
    let m = (p2.value - p1.value) / (p2.bar_index as f64 - p1.bar_index as f64);
    let c = p1.value - m * p1.bar_index as f64;

    Some(BoundaryLine {
        group_id: Uuid::new_v4().to_string(),
        pattern,
        side,
        start_idx: p1.bar_index,
        end_idx: p2.bar_index,
        start_ts: p1.timestamp,
        end_ts: p2.timestamp,
        y1: p1.value,
        y2: p2.value,
        slope_per_bar: m,
        intercept: c,
        confidence,
    })
}

/// Resistance through the last two of three strictly falling highs, and
/// support through the last two of three strictly rising lows.
fn reversal_lines(highs: &[&Pivot], lows: &[&Pivot]) -> Vec<BoundaryLine> {
    let mut out = Vec::new();

    if highs.len() >= 3 {
        let h1 = highs[highs.len() - 3];
        let h2 = highs[highs.len() - 2];
        let h3 = highs[highs.len() - 1];
        if h1.value > h2.value && h2.value > h3.value {
            out.extend(fit_line(
                h2,
                h3,
                LineSide::Resistance,
                Some(PatternType::ReversalResistance),
                REVERSAL_CONFIDENCE,
            ));
        }
    }

    if lows.len() >= 3 {
        let l1 = lows[lows.len() - 3];
        let l2 = lows[lows.len() - 2];
        let l3 = lows[lows.len() - 1];
        if l1.value < l2.value && l2.value < l3.value {
            out.extend(fit_line(
                l2,
                l3,
                LineSide::Support,
                Some(PatternType::ReversalSupport),
                REVERSAL_CONFIDENCE,
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PivotKind;
    use chrono::{TimeZone, Utc};

    fn make_pivot(idx: usize, kind: PivotKind, value: f64) -> Pivot {
        let ts = Utc.timestamp_opt(1_700_000_000 + idx as i64 * 60, 0).unwrap();
        Pivot {
            kind,
            timestamp: ts,
            sequence: ts.timestamp(),
            bar_index: idx,
            value,
            atr_at_pivot: 1.0,
            retracement_pct: None,
            extension_pct: None,
        }
    }

    fn config() -> ClassifierConfig {
        ClassifierConfig::default()
    }

    /// Alternating pivot sequence from (index, kind, value) triples.
    fn pivot_seq(points: &[(usize, PivotKind, f64)]) -> Vec<Pivot> {
        points
            .iter()
            .map(|&(idx, kind, value)| make_pivot(idx, kind, value))
            .collect()
    }

    #[test]
    fn test_fewer_than_four_pivots_yields_nothing() {
        let pivots = pivot_seq(&[
            (0, PivotKind::Low, 100.0),
            (10, PivotKind::High, 110.0),
            (20, PivotKind::Low, 102.0),
        ]);
        assert!(classify(&pivots, &config()).is_empty());
    }

    #[test]
    fn test_contracting_triangle() {
        // Falling highs, rising lows, gap 20 → 5
        let pivots = pivot_seq(&[
            (0, PivotKind::Low, 90.0),
            (10, PivotKind::High, 110.0),
            (20, PivotKind::Low, 95.0),
            (30, PivotKind::High, 105.0),
            (40, PivotKind::Low, 98.0),
            (50, PivotKind::High, 101.0),
        ]);
        let lines = classify(&pivots, &config());

        let upper = lines.iter().find(|l| l.side == LineSide::Upper).unwrap();
        let lower = lines.iter().find(|l| l.side == LineSide::Lower).unwrap();
        assert_eq!(upper.pattern, Some(PatternType::TriangleContracting));
        assert_eq!(lower.pattern, Some(PatternType::TriangleContracting));
        assert_eq!(upper.group_id, lower.group_id);
        assert!(upper.slope_per_bar < 0.0);
        assert!(lower.slope_per_bar > 0.0);
    }

    #[test]
    fn test_ascending_wedge() {
        // Both boundaries rising
        let pivots = pivot_seq(&[
            (0, PivotKind::Low, 100.0),
            (10, PivotKind::High, 110.0),
            (20, PivotKind::Low, 104.0),
            (30, PivotKind::High, 113.0),
            (40, PivotKind::Low, 108.0),
            (50, PivotKind::High, 116.0),
        ]);
        let lines = classify(&pivots, &config());
        let upper = lines.iter().find(|l| l.side == LineSide::Upper).unwrap();
        assert_eq!(upper.pattern, Some(PatternType::WedgeAscending));
    }

    #[test]
    fn test_triangle_lines_never_emitted_alone() {
        let pivots = pivot_seq(&[
            (0, PivotKind::Low, 90.0),
            (10, PivotKind::High, 110.0),
            (20, PivotKind::Low, 95.0),
            (30, PivotKind::High, 105.0),
        ]);
        let lines = classify(&pivots, &config());
        let uppers = lines.iter().filter(|l| l.side == LineSide::Upper).count();
        let lowers = lines.iter().filter(|l| l.side == LineSide::Lower).count();
        assert_eq!(uppers, lowers, "upper/lower must come as a matched pair");
    }

    #[test]
    fn test_reversal_resistance_on_three_lower_highs() {
        let pivots = pivot_seq(&[
            (5, PivotKind::Low, 95.0),
            (10, PivotKind::High, 110.0),
            (15, PivotKind::Low, 96.0),
            (20, PivotKind::High, 105.0),
            (25, PivotKind::Low, 94.0),
            (30, PivotKind::High, 100.0),
        ]);
        let lines = classify(&pivots, &config());
        let res = lines
            .iter()
            .find(|l| l.side == LineSide::Resistance)
            .expect("resistance line expected");
        assert_eq!(res.pattern, Some(PatternType::ReversalResistance));
        assert_eq!(res.start_idx, 20);
        assert_eq!(res.end_idx, 30);
        assert!((res.confidence - 0.65).abs() < 1e-12);
        // Slope: (100 - 105) / (30 - 20)
        assert!((res.slope_per_bar + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reversal_support_on_three_higher_lows() {
        let pivots = pivot_seq(&[
            (5, PivotKind::High, 110.0),
            (10, PivotKind::Low, 95.0),
            (15, PivotKind::High, 109.0),
            (20, PivotKind::Low, 97.0),
            (25, PivotKind::High, 108.0),
            (30, PivotKind::Low, 99.0),
        ]);
        let lines = classify(&pivots, &config());
        let sup = lines
            .iter()
            .find(|l| l.side == LineSide::Support)
            .expect("support line expected");
        assert_eq!(sup.pattern, Some(PatternType::ReversalSupport));
        assert_eq!(sup.start_idx, 20);
        assert_eq!(sup.end_idx, 30);
    }

    #[test]
    fn test_equal_indices_omit_line_without_error() {
        // Two highs on the same bar index: upper fit is degenerate, so no
        // triangle pair may be emitted
        let pivots = pivot_seq(&[
            (0, PivotKind::Low, 90.0),
            (10, PivotKind::High, 110.0),
            (20, PivotKind::Low, 95.0),
            (10, PivotKind::High, 108.0),
        ]);
        let lines = classify(&pivots, &config());
        assert!(lines.iter().all(|l| l.side != LineSide::Upper));
        assert!(lines.iter().all(|l| l.side != LineSide::Lower));
    }
}
