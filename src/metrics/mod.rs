pub mod summary;
pub mod timeseries;

pub use summary::PerformanceSummary;
pub use timeseries::{build_equity_curve, EquityPoint};
