use crate::engine::simulation::{TradeAction, TradeEvent};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

//aggregate performance of one backtest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub profit: f64,
    pub percentage_profit: f64,
    pub num_trades: usize,
    pub num_buys: usize,
    pub num_sells: usize,
    pub open_position_at_end: bool,
}

impl PerformanceSummary {
    //reduces a run to profit and percentage return
    //the initial balance is guaranteed positive by config validation
    pub fn from_run(initial_balance: f64, final_balance: f64, trades: &[TradeEvent]) -> Self {
        let profit = final_balance - initial_balance;
        let percentage_profit = 100.0 * profit / initial_balance;

        let num_buys = trades
            .iter()
            .filter(|t| t.action == TradeAction::Buy)
            .count();
        let num_sells = trades.len() - num_buys;

        //buys and sells alternate, so a trailing buy means the last
        //position was never closed
        let open_position_at_end =
            matches!(trades.last(), Some(t) if t.action == TradeAction::Buy);

        PerformanceSummary {
            initial_balance,
            final_balance,
            profit,
            percentage_profit,
            num_trades: trades.len(),
            num_buys,
            num_sells,
            open_position_at_end,
        }
    }

    //prints the summary in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Initial Balance"),
            Cell::new(&format!("${:.2}", self.initial_balance)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Final Balance"),
            Cell::new(&format!("${:.2}", self.final_balance)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Profit"),
            Cell::new(&format!("${:.2}", self.profit)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Percentage Profit"),
            Cell::new(&format!("{:.2}%", self.percentage_profit)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Number of Trades"),
            Cell::new(&format!("{}", self.num_trades)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Buys"),
            Cell::new(&format!("{}", self.num_buys)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Sells"),
            Cell::new(&format!("{}", self.num_sells)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Open Position At End"),
            Cell::new(if self.open_position_at_end { "yes" } else { "no" }),
        ]));

        table.printstd();
    }
}
