pub mod rolling_mean;

pub use rolling_mean::{prepare_bars, window_size, PreparedBar};
