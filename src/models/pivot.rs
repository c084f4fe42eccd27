use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotKind {
    High,
    Low,
}

impl PivotKind {
    pub fn opposite(&self) -> Self {
        match self {
            PivotKind::High => PivotKind::Low,
            PivotKind::Low => PivotKind::High,
        }
    }
}

/// A confirmed swing point: a local extreme followed by a sufficient reversal.
///
/// Within one detector output the kinds strictly alternate and `sequence`
/// strictly increases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pivot {
    pub kind: PivotKind,
    pub timestamp: DateTime<Utc>,
    /// Epoch seconds of the pivot bar; the stable ordering key.
    pub sequence: i64,
    pub bar_index: usize,
    /// Price at the pivot: the bar high for `High`, the bar low for `Low`.
    pub value: f64,
    pub atr_at_pivot: f64,
    pub retracement_pct: Option<f64>,
    pub extension_pct: Option<f64>,
}

impl Pivot {
    pub fn is_high(&self) -> bool {
        self.kind == PivotKind::High
    }

    pub fn is_low(&self) -> bool {
        self.kind == PivotKind::Low
    }
}
