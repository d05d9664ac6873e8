use crate::config::StrategyConfig;
use crate::data::Bar;
use crate::engine::simulation::{Simulator, TradeEvent};
use crate::metrics::{build_equity_curve, EquityPoint, PerformanceSummary};
use crate::series::{prepare_bars, PreparedBar};

//result of a backtest
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub summary: PerformanceSummary,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeEvent>,
}

//main backtest engine: prepares the series, runs the simulation and
//derives the equity curve and performance summary
pub struct BacktestEngine {
    config: StrategyConfig,
    bars: Vec<Bar>,
}

impl BacktestEngine {
    //creates a new backtest engine
    //the config is validated at construction by StrategyConfig and the
    //bars satisfy the loader contract
    pub fn new(config: StrategyConfig, bars: Vec<Bar>) -> Self {
        BacktestEngine { config, bars }
    }

    //runs the full pipeline over the loaded series
    pub fn run(&self) -> BacktestResult {
        let prepared = self.prepare();
        let result = Simulator::new(&self.config).run(&prepared);

        let equity_curve =
            build_equity_curve(&prepared, &result.trades, self.config.initial_balance);
        let summary = PerformanceSummary::from_run(
            self.config.initial_balance,
            result.final_balance,
            &result.trades,
        );

        BacktestResult {
            summary,
            equity_curve,
            trades: result.trades,
        }
    }

    //prepares the series with the configured rolling-mean window
    pub fn prepare(&self) -> Vec<PreparedBar> {
        prepare_bars(&self.bars, self.config.window_size())
    }

    //returns the configuration
    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::simulation::TradeAction;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn hourly_bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                Bar::new_unchecked(
                    Utc.timestamp_millis_opt(i as i64 * 3_600_000).single().unwrap(),
                    close,
                    close,
                    close,
                    close,
                    1000.0,
                )
            })
            .collect()
    }

    //one hour mean period over 60 minute bars: two-bar trailing window
    fn config() -> StrategyConfig {
        StrategyConfig::new(1000.0, 0.04, 0.02, 0.03, 1.0, 60.0).unwrap()
    }

    #[test]
    fn full_round_trip() {
        //the drop to 90 pulls the close below 96% of the two-bar mean,
        //and the bounce to 93 crosses the take profit at 92.7
        let bars = hourly_bars(&[100.0, 100.0, 100.0, 90.0, 93.0]);
        let result = BacktestEngine::new(config(), bars).run();

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].action, TradeAction::Buy);
        assert_relative_eq!(result.trades[0].price, 90.0);
        assert_relative_eq!(result.trades[0].balance, 1000.0);
        assert_eq!(result.trades[1].action, TradeAction::Sell);
        assert_relative_eq!(
            result.summary.final_balance,
            1000.0 / 90.0 * 93.0,
            epsilon = 1e-9
        );

        assert_eq!(result.equity_curve.len(), 5);
        assert_relative_eq!(result.equity_curve[0].equity, 1000.0);
        assert_relative_eq!(
            result.equity_curve[4].equity,
            result.summary.final_balance,
            epsilon = 1e-9
        );
    }

    #[test]
    fn flat_series_trades_nothing() {
        let bars = hourly_bars(&[100.0, 100.0, 100.0, 100.0]);
        let result = BacktestEngine::new(config(), bars).run();

        assert!(result.trades.is_empty());
        assert_relative_eq!(result.summary.profit, 0.0);
        assert_relative_eq!(result.summary.percentage_profit, 0.0);
        assert_eq!(result.equity_curve.len(), 4);
        for point in &result.equity_curve {
            assert_relative_eq!(point.equity, 1000.0);
        }
    }

    #[test]
    fn empty_series_produces_empty_result() {
        let result = BacktestEngine::new(config(), Vec::new()).run();

        assert!(result.trades.is_empty());
        assert!(result.equity_curve.is_empty());
        assert_relative_eq!(result.summary.final_balance, 1000.0);
    }
}
