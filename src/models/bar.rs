use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV candle.
///
/// Series handed to the detector must be strictly time-ordered with no
/// duplicate timestamps; that is a caller precondition, not validated here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let hl = self.high - self.low;
        match prev_close {
            Some(pc) => {
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => hl,
        }
    }

    /// Sequence key used for pivot ordering and window trimming.
    pub fn sequence(&self) -> i64 {
        self.timestamp.timestamp()
    }
}
