pub mod crop_yield;
pub mod daily;
pub mod yearly;

pub use crop_yield::YieldRecord;
pub use daily::{parse_line, DailyObservation};
pub use yearly::YearlyAggregate;

/// Marker for a missing daily reading.
pub const MISSING: i64 = -9999;
