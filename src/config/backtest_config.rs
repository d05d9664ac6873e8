use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Initial balance must be positive, got {0}")]
    NonPositiveInitialBalance(f64),
    #[error("{name} must be inside the open interval (0, 1), got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("{name} must be positive, got {value}")]
    NonPositivePeriod { name: &'static str, value: f64 },
}

//strategy parameters, validated once at construction and immutable for the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub initial_balance: f64,
    pub entry_threshold: f64,
    pub stoploss_threshold: f64,
    pub take_profit_threshold: f64,
    pub mean_period_in_hours: f64,
    pub bar_duration_in_minutes: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            initial_balance: 1000.0,
            entry_threshold: 0.04,
            stoploss_threshold: 0.02,
            take_profit_threshold: 0.03,
            mean_period_in_hours: 4.0,
            bar_duration_in_minutes: 5.0,
        }
    }
}

impl StrategyConfig {
    //creates a validated config
    pub fn new(
        initial_balance: f64,
        entry_threshold: f64,
        stoploss_threshold: f64,
        take_profit_threshold: f64,
        mean_period_in_hours: f64,
        bar_duration_in_minutes: f64,
    ) -> Result<Self, ConfigError> {
        let config = StrategyConfig {
            initial_balance,
            entry_threshold,
            stoploss_threshold,
            take_profit_threshold,
            mean_period_in_hours,
            bar_duration_in_minutes,
        };
        config.validate()?;
        Ok(config)
    }

    //checks every parameter; fails here at construction, never mid-run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(ConfigError::NonPositiveInitialBalance(self.initial_balance));
        }

        check_threshold("entry_threshold", self.entry_threshold)?;
        check_threshold("stoploss_threshold", self.stoploss_threshold)?;
        check_threshold("take_profit_threshold", self.take_profit_threshold)?;
        check_period("mean_period_in_hours", self.mean_period_in_hours)?;
        check_period("bar_duration_in_minutes", self.bar_duration_in_minutes)?;

        Ok(())
    }

    //number of bars in the trailing rolling-mean window
    pub fn window_size(&self) -> usize {
        crate::series::window_size(self.mean_period_in_hours, self.bar_duration_in_minutes)
    }

    //derives a copy with different thresholds, re-validated
    pub fn with_thresholds(
        &self,
        entry_threshold: f64,
        stoploss_threshold: f64,
        take_profit_threshold: f64,
    ) -> Result<Self, ConfigError> {
        StrategyConfig::new(
            self.initial_balance,
            entry_threshold,
            stoploss_threshold,
            take_profit_threshold,
            self.mean_period_in_hours,
            self.bar_duration_in_minutes,
        )
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange { name, value })
    }
}

fn check_period(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositivePeriod { name, value })
    }
}

//complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfiguration {
    //data
    pub data_path: PathBuf,

    //strategy parameters
    pub strategy: StrategyConfig,

    //optional output paths
    pub output_equity_csv: Option<PathBuf>,
    pub output_trades_csv: Option<PathBuf>,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        RunConfiguration {
            data_path: PathBuf::from("data.csv"),
            strategy: StrategyConfig::default(),
            output_equity_csv: None,
            output_trades_csv: None,
        }
    }
}

impl RunConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: RunConfiguration = serde_json::from_str(&contents)?;
        config.strategy.validate()?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
