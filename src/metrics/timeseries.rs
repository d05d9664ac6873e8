use crate::engine::simulation::TradeEvent;
use crate::series::PreparedBar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//a point in the equity curve
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

//projects the trade history onto the full timestamp axis
//equity at a trade timestamp is the balance recorded on that event,
//forward-filled in between, and the initial balance before the first
//trade; the curve always has one point per input bar
pub fn build_equity_curve(
    bars: &[PreparedBar],
    trades: &[TradeEvent],
    initial_balance: f64,
) -> Vec<EquityPoint> {
    let mut curve = Vec::with_capacity(bars.len());
    let mut equity = initial_balance;
    let mut next_trade = 0;

    for bar in bars {
        while next_trade < trades.len() && trades[next_trade].timestamp <= bar.timestamp {
            equity = trades[next_trade].balance;
            next_trade += 1;
        }

        curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity,
        });
    }

    curve
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::simulation::TradeAction;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn ts(i: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(i * 300_000).single().unwrap()
    }

    fn bars(n: i64) -> Vec<PreparedBar> {
        (0..n)
            .map(|i| PreparedBar {
                timestamp: ts(i),
                open: 100.0,
                high: 100.0,
                low: 100.0,
                close: 100.0,
                volume: 1000.0,
                mean: 100.0,
            })
            .collect()
    }

    fn event(i: i64, action: TradeAction, balance: f64) -> TradeEvent {
        TradeEvent {
            timestamp: ts(i),
            action,
            price: 100.0,
            balance,
        }
    }

    #[test]
    fn one_point_per_bar() {
        let curve = build_equity_curve(&bars(7), &[], 1000.0);
        assert_eq!(curve.len(), 7);
    }

    #[test]
    fn seeds_initial_balance_before_first_trade() {
        let trades = vec![event(2, TradeAction::Buy, 1000.0)];
        let curve = build_equity_curve(&bars(4), &trades, 1000.0);

        assert_relative_eq!(curve[0].equity, 1000.0);
        assert_relative_eq!(curve[1].equity, 1000.0);
    }

    #[test]
    fn forward_fills_between_trades() {
        let trades = vec![
            event(1, TradeAction::Buy, 1000.0),
            event(3, TradeAction::Sell, 1250.0),
        ];
        let curve = build_equity_curve(&bars(5), &trades, 1000.0);

        let expected = [1000.0, 1000.0, 1000.0, 1250.0, 1250.0];
        for (point, &value) in curve.iter().zip(expected.iter()) {
            assert_relative_eq!(point.equity, value);
        }
    }

    #[test]
    fn buy_only_history_still_yields_full_curve() {
        let trades = vec![event(1, TradeAction::Buy, 1000.0)];
        let curve = build_equity_curve(&bars(4), &trades, 1000.0);

        assert_eq!(curve.len(), 4);
        for point in &curve {
            assert_relative_eq!(point.equity, 1000.0);
        }
    }

    #[test]
    fn no_trades_holds_initial_balance() {
        let curve = build_equity_curve(&bars(3), &[], 500.0);
        for point in &curve {
            assert_relative_eq!(point.equity, 500.0);
        }
    }

    #[test]
    fn empty_bars_yield_empty_curve() {
        let trades = vec![event(0, TradeAction::Buy, 1000.0)];
        assert!(build_equity_curve(&[], &trades, 1000.0).is_empty());
    }
}
