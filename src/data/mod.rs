pub mod bar;
pub mod loader;

pub use bar::Bar;
pub use loader::{clean_bars, describe, load_csv, validate_bars, DataSummary, SeriesError};
