use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use meanrev::prelude::*;
use prettytable::{Cell, Row, Table};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "meanrev")]
#[command(about = "A Rust-based mean-reversion backtesting engine for OHLC data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a backtest
    Run {
        //path to csv data file
        #[arg(long)]
        data: PathBuf,

        //initial account balance
        #[arg(long, default_value = "1000")]
        initial_balance: f64,

        //entry threshold as a fraction below the rolling mean
        #[arg(long, default_value = "0.04")]
        entry_threshold: f64,

        //stoploss threshold as a fraction below the entry price
        #[arg(long, default_value = "0.02")]
        stoploss_threshold: f64,

        //take profit threshold as a fraction above the entry price
        #[arg(long, default_value = "0.03")]
        take_profit_threshold: f64,

        //rolling mean period in hours
        #[arg(long, default_value = "4")]
        mean_period_hours: f64,

        //bar duration of the input data in minutes
        #[arg(long, default_value = "5")]
        bar_minutes: f64,

        //output options
        //output path for equity curve csv
        #[arg(long)]
        output_equity_csv: Option<PathBuf>,

        //output path for trades csv
        #[arg(long)]
        output_trades_csv: Option<PathBuf>,
    },

    //sweep threshold combinations in parallel over one data set
    Sweep {
        //path to csv data file
        #[arg(long)]
        data: PathBuf,

        //initial account balance
        #[arg(long, default_value = "1000")]
        initial_balance: f64,

        //comma-separated entry thresholds
        #[arg(long, default_value = "0.02,0.04,0.06")]
        entry_thresholds: String,

        //comma-separated stoploss thresholds
        #[arg(long, default_value = "0.01,0.02,0.03")]
        stoploss_thresholds: String,

        //comma-separated take profit thresholds
        #[arg(long, default_value = "0.02,0.03,0.05")]
        take_profit_thresholds: String,

        //rolling mean period in hours
        #[arg(long, default_value = "4")]
        mean_period_hours: f64,

        //bar duration of the input data in minutes
        #[arg(long, default_value = "5")]
        bar_minutes: f64,

        //number of top outcomes to display
        #[arg(long, default_value = "10")]
        top: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            initial_balance,
            entry_threshold,
            stoploss_threshold,
            take_profit_threshold,
            mean_period_hours,
            bar_minutes,
            output_equity_csv,
            output_trades_csv,
        } => {
            run_backtest(
                data,
                initial_balance,
                entry_threshold,
                stoploss_threshold,
                take_profit_threshold,
                mean_period_hours,
                bar_minutes,
                output_equity_csv,
                output_trades_csv,
            )?;
        }
        Commands::Sweep {
            data,
            initial_balance,
            entry_thresholds,
            stoploss_thresholds,
            take_profit_thresholds,
            mean_period_hours,
            bar_minutes,
            top,
        } => {
            run_threshold_sweep(
                data,
                initial_balance,
                entry_thresholds,
                stoploss_thresholds,
                take_profit_thresholds,
                mean_period_hours,
                bar_minutes,
                top,
            )?;
        }
    }

    Ok(())
}

//loads, cleans and checks the series, then prints a short data summary
fn load_and_clean(data_path: &PathBuf) -> Result<Vec<Bar>> {
    println!("Loading data from {:?}...", data_path);
    let raw =
        load_csv(data_path).context(format!("Failed to load data from {:?}", data_path))?;

    let bars = clean_bars(raw);

    if bars.is_empty() {
        anyhow::bail!("No usable bars in {:?}", data_path);
    }

    validate_bars(&bars)?;

    if let Some(summary) = describe(&bars) {
        println!("Loaded {} bars", summary.bar_count);
        println!(
            "Date range: {} to {}",
            summary.first_timestamp, summary.last_timestamp
        );
        println!(
            "Close: min {:.2}, max {:.2}, mean {:.2}, std dev {:.2}\n",
            summary.close_min, summary.close_max, summary.close_mean, summary.close_std_dev
        );
    }

    Ok(bars)
}

#[allow(clippy::too_many_arguments)]
fn run_backtest(
    data_path: PathBuf,
    initial_balance: f64,
    entry_threshold: f64,
    stoploss_threshold: f64,
    take_profit_threshold: f64,
    mean_period_hours: f64,
    bar_minutes: f64,
    output_equity_csv: Option<PathBuf>,
    output_trades_csv: Option<PathBuf>,
) -> Result<()> {
    println!("Meanrev Backtesting Engine");
    println!("==========================\n");

    let bars = load_and_clean(&data_path)?;

    let config = StrategyConfig::new(
        initial_balance,
        entry_threshold,
        stoploss_threshold,
        take_profit_threshold,
        mean_period_hours,
        bar_minutes,
    )?;

    println!(
        "Strategy: Mean Reversion (entry={}, stoploss={}, take profit={})",
        config.entry_threshold, config.stoploss_threshold, config.take_profit_threshold
    );
    println!(
        "Rolling mean: {} hours over {} minute bars ({} bar window)",
        config.mean_period_in_hours,
        config.bar_duration_in_minutes,
        config.window_size()
    );
    println!("Initial balance: ${:.2}\n", config.initial_balance);

    println!("Running backtest...\n");
    let engine = BacktestEngine::new(config, bars);
    let result = engine.run();

    println!("Backtest Results");
    println!("================\n");
    result.summary.pretty_print_table();

    if let Some(equity_path) = output_equity_csv {
        save_equity_csv(&result.equity_curve, &equity_path)?;
        println!("\nEquity curve saved to {:?}", equity_path);
    }

    if let Some(trades_path) = output_trades_csv {
        save_trades_csv(&result.trades, &trades_path)?;
        println!("Trades saved to {:?}", trades_path);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_threshold_sweep(
    data_path: PathBuf,
    initial_balance: f64,
    entry_thresholds: String,
    stoploss_thresholds: String,
    take_profit_thresholds: String,
    mean_period_hours: f64,
    bar_minutes: f64,
    top: usize,
) -> Result<()> {
    println!("Meanrev Threshold Sweep");
    println!("=======================\n");

    let bars = load_and_clean(&data_path)?;

    let base = StrategyConfig {
        initial_balance,
        mean_period_in_hours: mean_period_hours,
        bar_duration_in_minutes: bar_minutes,
        ..StrategyConfig::default()
    };
    base.validate()?;

    let grid = SweepGrid {
        entry_thresholds: parse_threshold_list(&entry_thresholds)?,
        stoploss_thresholds: parse_threshold_list(&stoploss_thresholds)?,
        take_profit_thresholds: parse_threshold_list(&take_profit_thresholds)?,
    };

    println!(
        "Sweeping {} combinations over {} bars...\n",
        grid.combination_count(),
        bars.len()
    );

    //one shared prepared series; every combination reads it in parallel
    let prepared = prepare_bars(&bars, base.window_size());
    let outcomes = run_sweep(&base, &grid, &prepared)?;

    println!("Top Outcomes");
    println!("============\n");

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Entry"),
        Cell::new("Stoploss"),
        Cell::new("Take Profit"),
        Cell::new("Final Balance"),
        Cell::new("Profit %"),
        Cell::new("Trades"),
    ]));

    for outcome in outcomes.iter().take(top) {
        table.add_row(Row::new(vec![
            Cell::new(&format!("{}", outcome.entry_threshold)),
            Cell::new(&format!("{}", outcome.stoploss_threshold)),
            Cell::new(&format!("{}", outcome.take_profit_threshold)),
            Cell::new(&format!("${:.2}", outcome.final_balance)),
            Cell::new(&format!("{:.2}%", outcome.percentage_profit)),
            Cell::new(&format!("{}", outcome.num_trades)),
        ]));
    }

    table.printstd();

    Ok(())
}

//parses a comma-separated list of threshold values
fn parse_threshold_list(list: &str) -> Result<Vec<f64>> {
    list.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .context(format!("Invalid threshold value '{}'", part))
        })
        .collect()
}

fn save_equity_csv(equity_curve: &[EquityPoint], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "timestamp,equity")?;

    for point in equity_curve {
        writeln!(file, "{},{}", point.timestamp.to_rfc3339(), point.equity)?;
    }

    Ok(())
}

fn save_trades_csv(trades: &[TradeEvent], path: &PathBuf) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "timestamp,action,price,balance")?;

    for trade in trades {
        writeln!(
            file,
            "{},{:?},{},{}",
            trade.timestamp.to_rfc3339(),
            trade.action,
            trade.price,
            trade.balance
        )?;
    }

    Ok(())
}
