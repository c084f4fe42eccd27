//! Retracement and extension percentages for confirmed pivots.
//!
//! Purely descriptive annotation over an already-detected pivot list; results
//! never feed back into detection.
//!
//! Assuming pivots alternate Low/High and are time-ordered:
//! - Retracement at pivot k (same kind as k-2): how much of the previous
//!   opposite swing the latest swing gave back, as a percentage.
//! - Extension at pivot k: size of the swing (k-1 → k) relative to the
//!   previous same-direction swing (k-3 → k-2), as a percentage.

use crate::models::{Pivot, PivotKind};

/// Annotate `retracement_pct` / `extension_pct` in place.
///
/// A metric is set only when its defining swing denominator is strictly
/// positive (and for extensions, the current swing is non-negative);
/// non-finite results are discarded.
pub fn annotate(pivots: &mut [Pivot]) {
    for k in 0..pivots.len() {
        if k >= 2 {
            let p2 = &pivots[k - 2];
            let p1 = &pivots[k - 1];
            let curr = &pivots[k];

            let retr = match (p2.kind, p1.kind, curr.kind) {
                (PivotKind::Low, PivotKind::High, PivotKind::Low) => {
                    let up_prev = p1.value - p2.value;
                    (up_prev > 0.0).then(|| (p1.value - curr.value) / up_prev * 100.0)
                }
                (PivotKind::High, PivotKind::Low, PivotKind::High) => {
                    let down_prev = p2.value - p1.value;
                    (down_prev > 0.0).then(|| (curr.value - p1.value) / down_prev * 100.0)
                }
                _ => None,
            };
            pivots[k].retracement_pct = retr.filter(|v| v.is_finite());
        }

        if k >= 3 {
            let p3 = &pivots[k - 3];
            let p2 = &pivots[k - 2];
            let p1 = &pivots[k - 1];
            let curr = &pivots[k];

            let ext = match (p3.kind, p2.kind, p1.kind, curr.kind) {
                (PivotKind::Low, PivotKind::High, PivotKind::Low, PivotKind::High) => {
                    let up_prev = p2.value - p3.value;
                    let up_curr = curr.value - p1.value;
                    (up_prev > 0.0 && up_curr >= 0.0).then(|| up_curr / up_prev * 100.0)
                }
                (PivotKind::High, PivotKind::Low, PivotKind::High, PivotKind::Low) => {
                    let down_prev = p3.value - p2.value;
                    let down_curr = p1.value - curr.value;
                    (down_prev > 0.0 && down_curr >= 0.0).then(|| down_curr / down_prev * 100.0)
                }
                _ => None,
            };
            pivots[k].extension_pct = ext.filter(|v| v.is_finite());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_retracement_on_low_high_low() {
        // 100 → 110 swing, then pullback to 105: 50% retracement
        let mut pivots = vec![
            make_pivot(0, PivotKind::Low, 100.0),
            make_pivot(10, PivotKind::High, 110.0),
            make_pivot(20, PivotKind::Low, 105.0),
        ];
        annotate(&mut pivots);
        let retr = pivots[2].retracement_pct.unwrap();
        assert!((retr - 50.0).abs() < 1e-9);
        assert!(pivots[0].retracement_pct.is_none());
        assert!(pivots[1].retracement_pct.is_none());
    }

    #[test]
    fn test_retracement_on_high_low_high() {
        // 110 → 100 swing down, then bounce to 102.5: 25% retracement
        let mut pivots = vec![
            make_pivot(0, PivotKind::High, 110.0),
            make_pivot(10, PivotKind::Low, 100.0),
            make_pivot(20, PivotKind::High, 102.5),
        ];
        annotate(&mut pivots);
        let retr = pivots[2].retracement_pct.unwrap();
        assert!((retr - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_extension_compares_same_direction_swings() {
        // Up swing 100→110 (10), pullback to 104, up swing 104→119 (15): 150%
        let mut pivots = vec![
            make_pivot(0, PivotKind::Low, 100.0),
            make_pivot(10, PivotKind::High, 110.0),
            make_pivot(20, PivotKind::Low, 104.0),
            make_pivot(30, PivotKind::High, 119.0),
        ];
        annotate(&mut pivots);
        let ext = pivots[3].extension_pct.unwrap();
        assert!((ext - 150.0).abs() < 1e-9);
        assert!(pivots[2].extension_pct.is_none());
    }

    #[test]
    fn test_zero_denominator_leaves_metric_unset() {
        // Degenerate flat "swing": denominator is 0, metric must stay None
        let mut pivots = vec![
            make_pivot(0, PivotKind::Low, 100.0),
            make_pivot(10, PivotKind::High, 100.0),
            make_pivot(20, PivotKind::Low, 100.0),
            make_pivot(30, PivotKind::High, 100.0),
        ];
        annotate(&mut pivots);
        assert!(pivots.iter().all(|p| p.retracement_pct.is_none()));
        assert!(pivots.iter().all(|p| p.extension_pct.is_none()));
    }

    #[test]
    fn test_negative_current_swing_skips_extension() {
        // Current "up swing" actually ends below its start; extension unset
        let mut pivots = vec![
            make_pivot(0, PivotKind::Low, 100.0),
            make_pivot(10, PivotKind::High, 110.0),
            make_pivot(20, PivotKind::Low, 104.0),
            make_pivot(30, PivotKind::High, 103.0),
        ];
        annotate(&mut pivots);
        assert!(pivots[3].extension_pct.is_none());
        // Retracement at k=3 still applies (High after Low after High)
        assert!(pivots[3].retracement_pct.is_some());
    }
}
