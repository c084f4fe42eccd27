//! True range, Wilder-smoothed ATR and relative volatility.
//!
//! The detector scales its thresholds by these series: ATR gives an absolute
//! price-unit floor, relative volatility (EMA of TR/close) gives a
//! scale-independent percentage that adapts the threshold to the regime.

use crate::models::Bar;

/// Compute the true range and Wilder-smoothed ATR series.
///
/// Warm-up: atr[0] = tr[0]; before `atr_length` bars the value is the running
/// simple mean; at exactly `atr_length` it is re-seeded as the plain mean of
/// the last `atr_length` true ranges; afterwards Wilder smoothing applies.
///
/// An `atr_length` of 0 is clamped to 1 (ATR equals the raw true range).
pub fn true_range_atr(bars: &[Bar], atr_length: usize) -> (Vec<f64>, Vec<f64>) {
    let atr_length = atr_length.max(1);
    let n = bars.len();
    let mut tr = vec![0.0; n];
    let mut atr = vec![0.0; n];

    for i in 0..n {
        let prev_close = if i == 0 { None } else { Some(bars[i - 1].close) };
        tr[i] = bars[i].true_range(prev_close);

        if i == 0 {
            atr[i] = tr[i];
        } else if i < atr_length {
            atr[i] = (atr[i - 1] * i as f64 + tr[i]) / (i + 1) as f64;
        } else if i == atr_length {
            let sum: f64 = tr[i + 1 - atr_length..=i].iter().sum();
            atr[i] = sum / atr_length as f64;
        } else {
            atr[i] = (atr[i - 1] * (atr_length - 1) as f64 + tr[i]) / atr_length as f64;
        }
    }

    (tr, atr)
}

/// EMA of TR/close with alpha = 2/(window+1), seeded with the first ratio.
///
/// A non-positive close counts as ratio 0 rather than producing an infinity.
pub fn relative_volatility(bars: &[Bar], tr: &[f64], window: usize) -> Vec<f64> {
    let n = bars.len();
    let mut rvol = vec![0.0; n];
    if n == 0 {
        return rvol;
    }

    let alpha = 2.0 / (window as f64 + 1.0);
    for i in 0..n {
        let close = bars[i].close;
        let ratio = if close > 0.0 { tr[i] / close } else { 0.0 };
        rvol[i] = if i == 0 {
            ratio
        } else {
            alpha * ratio + (1.0 - alpha) * rvol[i - 1]
        };
    }
    rvol
}
