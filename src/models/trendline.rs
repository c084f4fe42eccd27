use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternType {
    TriangleContracting,
    TriangleExpanding,
    WedgeAscending,
    WedgeDescending,
    ReversalResistance,
    ReversalSupport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineSide {
    Upper,
    Lower,
    Support,
    Resistance,
}

/// A two-point linear fit over bar index: `y = slope_per_bar * idx + intercept`.
///
/// Lines belonging to the same detected pattern instance (e.g. the upper and
/// lower side of a triangle) share a `group_id`. The link is lookup-only:
/// consumers that need the pair build a map keyed by `group_id`; the records
/// themselves never reference each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryLine {
    pub group_id: String,
    pub pattern: Option<PatternType>,
    pub side: LineSide,
    pub start_idx: usize,
    pub end_idx: usize,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub y1: f64,
    pub y2: f64,
    pub slope_per_bar: f64,
    pub intercept: f64,
    /// Confidence score in [0, 1].
    pub confidence: f64,
}

impl BoundaryLine {
    /// Evaluate the line's linear equation at a bar index.
    pub fn value_at(&self, idx: usize) -> f64 {
        self.slope_per_bar * idx as f64 + self.intercept
    }
}
