use crate::config::StrategyConfig;
use crate::series::PreparedBar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//direction of a recorded trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

//immutable record of one executed trade
//balance holds the pre-trade cash for buys and the post-trade cash for sells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvent {
    pub timestamp: DateTime<Utc>,
    pub action: TradeAction,
    pub price: f64,
    pub balance: f64,
}

//mutable state of the single-position state machine, one instance per run
#[derive(Debug, Clone)]
pub struct PositionState {
    //cash balance; stale while a position is open, units_held is the
    //authoritative exposure signal
    pub balance: f64,

    //asset units held; 0 while flat
    pub units_held: f64,

    //entry price of the open position, meaningful only while long
    pub entry_price: f64,

    //exit bound below the entry price
    pub stoploss_price: f64,

    //exit bound above the entry price
    pub take_profit_price: f64,
}

impl PositionState {
    //creates a fresh flat state
    pub fn new(initial_balance: f64) -> Self {
        PositionState {
            balance: initial_balance,
            units_held: 0.0,
            entry_price: 0.0,
            stoploss_price: 0.0,
            take_profit_price: 0.0,
        }
    }

    //returns true while no position is open
    pub fn is_flat(&self) -> bool {
        self.units_held == 0.0
    }

    //returns true while a long position is open
    pub fn is_long(&self) -> bool {
        self.units_held > 0.0
    }
}

//result of one simulation run
//if the run ended with an open position, final_balance is the last cash
//value recorded while flat; the open position is not marked to market
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub trades: Vec<TradeEvent>,
    pub final_balance: f64,
}

//single-position mean-reversion state machine
//walks prepared bars in chronological order and flips between flat and long
pub struct Simulator {
    entry_threshold: f64,
    stoploss_threshold: f64,
    take_profit_threshold: f64,
    state: PositionState,
    trades: Vec<TradeEvent>,
}

impl Simulator {
    //creates a simulator with a fresh position state
    pub fn new(config: &StrategyConfig) -> Self {
        Simulator {
            entry_threshold: config.entry_threshold,
            stoploss_threshold: config.stoploss_threshold,
            take_profit_threshold: config.take_profit_threshold,
            state: PositionState::new(config.initial_balance),
            trades: Vec::new(),
        }
    }

    //evaluates one bar
    //entry and exit trigger on the closing price only, never intrabar
    //high/low, and both comparisons are inclusive
    pub fn on_bar(&mut self, bar: &PreparedBar) {
        if self.state.is_flat() {
            let entry_threshold_price = bar.mean * (1.0 - self.entry_threshold);

            if bar.close <= entry_threshold_price {
                //open a long position with the entire cash balance
                self.state.units_held = self.state.balance / bar.close;
                self.state.entry_price = bar.close;
                self.state.stoploss_price = bar.close * (1.0 - self.stoploss_threshold);
                self.state.take_profit_price = bar.close * (1.0 + self.take_profit_threshold);

                //the recorded balance is the pre-trade cash, kept as-is
                //in the event for audit
                self.trades.push(TradeEvent {
                    timestamp: bar.timestamp,
                    action: TradeAction::Buy,
                    price: bar.close,
                    balance: self.state.balance,
                });
            }
        } else if bar.close <= self.state.stoploss_price
            || bar.close >= self.state.take_profit_price
        {
            //either bound closes the position at the same closing price
            self.state.balance = self.state.units_held * bar.close;
            self.state.units_held = 0.0;

            self.trades.push(TradeEvent {
                timestamp: bar.timestamp,
                action: TradeAction::Sell,
                price: bar.close,
                balance: self.state.balance,
            });
        }
    }

    //runs the state machine over a full series
    //an open position at the end of the series is left open
    pub fn run(mut self, bars: &[PreparedBar]) -> SimulationResult {
        for bar in bars {
            self.on_bar(bar);
        }

        SimulationResult {
            trades: self.trades,
            final_balance: self.state.balance,
        }
    }

    //returns the current position state
    pub fn state(&self) -> &PositionState {
        &self.state
    }

    //returns the trades recorded so far
    pub fn trades(&self) -> &[TradeEvent] {
        &self.trades
    }
}
