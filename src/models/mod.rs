pub mod bar;
pub mod pivot;
pub mod timeframe;
pub mod trendline;

pub use bar::Bar;
pub use pivot::{Pivot, PivotKind};
pub use timeframe::Timeframe;
pub use trendline::{BoundaryLine, LineSide, PatternType};
