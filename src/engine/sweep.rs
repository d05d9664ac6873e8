use crate::config::{ConfigError, StrategyConfig};
use crate::engine::simulation::Simulator;
use crate::series::PreparedBar;
use rayon::prelude::*;
use std::cmp::Ordering;

//grid of threshold values to sweep over
#[derive(Debug, Clone)]
pub struct SweepGrid {
    pub entry_thresholds: Vec<f64>,
    pub stoploss_thresholds: Vec<f64>,
    pub take_profit_thresholds: Vec<f64>,
}

impl SweepGrid {
    //number of combinations in the grid
    pub fn combination_count(&self) -> usize {
        self.entry_thresholds.len()
            * self.stoploss_thresholds.len()
            * self.take_profit_thresholds.len()
    }
}

//outcome of one sweep combination
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub entry_threshold: f64,
    pub stoploss_threshold: f64,
    pub take_profit_threshold: f64,
    pub final_balance: f64,
    pub profit: f64,
    pub percentage_profit: f64,
    pub num_trades: usize,
}

//runs every threshold combination over a shared read-only prepared series
//each combination gets its own position state, so runs are independent
//and execute in parallel
pub fn run_sweep(
    base: &StrategyConfig,
    grid: &SweepGrid,
    prepared: &[PreparedBar],
) -> Result<Vec<SweepOutcome>, ConfigError> {
    //validate every combination before any run starts
    let mut configs = Vec::with_capacity(grid.combination_count());
    for &entry in &grid.entry_thresholds {
        for &stoploss in &grid.stoploss_thresholds {
            for &take_profit in &grid.take_profit_thresholds {
                configs.push(base.with_thresholds(entry, stoploss, take_profit)?);
            }
        }
    }

    let mut outcomes: Vec<SweepOutcome> = configs
        .par_iter()
        .map(|config| {
            let result = Simulator::new(config).run(prepared);
            let profit = result.final_balance - config.initial_balance;

            SweepOutcome {
                entry_threshold: config.entry_threshold,
                stoploss_threshold: config.stoploss_threshold,
                take_profit_threshold: config.take_profit_threshold,
                final_balance: result.final_balance,
                profit,
                percentage_profit: 100.0 * profit / config.initial_balance,
                num_trades: result.trades.len(),
            }
        })
        .collect();

    //best final balance first; threshold order breaks ties so the
    //report is deterministic
    outcomes.sort_by(|a, b| {
        compare(b.final_balance, a.final_balance)
            .then(compare(a.entry_threshold, b.entry_threshold))
            .then(compare(a.stoploss_threshold, b.stoploss_threshold))
            .then(compare(a.take_profit_threshold, b.take_profit_threshold))
    });

    Ok(outcomes)
}

fn compare(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
