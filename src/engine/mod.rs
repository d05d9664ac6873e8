pub mod backtest;
pub mod simulation;
pub mod sweep;

pub use backtest::{BacktestEngine, BacktestResult};
pub use simulation::{PositionState, SimulationResult, Simulator, TradeAction, TradeEvent};
pub use sweep::{run_sweep, SweepGrid, SweepOutcome};
