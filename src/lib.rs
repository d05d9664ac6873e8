//a Rust-based mean-reversion backtesting engine for OHLC market data

pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;
pub mod series;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigError, RunConfiguration, StrategyConfig};
    pub use crate::data::{
        clean_bars, describe, load_csv, validate_bars, Bar, DataSummary, SeriesError,
    };
    pub use crate::engine::{
        run_sweep, BacktestEngine, BacktestResult, PositionState, SimulationResult, Simulator,
        SweepGrid, SweepOutcome, TradeAction, TradeEvent,
    };
    pub use crate::metrics::{build_equity_curve, EquityPoint, PerformanceSummary};
    pub use crate::series::{prepare_bars, window_size, PreparedBar};
}
