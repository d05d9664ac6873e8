use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarError {
    #[error("Invalid OHLC values: high ({high}) < low ({low})")]
    InvalidHighLow { high: f64, low: f64 },
    #[error("Invalid OHLC values: close ({close}) outside high-low range [{low}, {high}]")]
    InvalidClose { close: f64, high: f64, low: f64 },
    #[error("Invalid OHLC values: open ({open}) outside high-low range [{low}, {high}]")]
    InvalidOpen { open: f64, high: f64, low: f64 },
    #[error("Non-positive price: {0}")]
    NonPositivePrice(f64),
    #[error("Non-positive volume: {0}")]
    NonPositiveVolume(f64),
}

//represents a single ohlcv bar (candlestick) of market data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    //creates a new Bar with validation
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, BarError> {
        //validate strictly positive prices
        for price in [open, high, low, close] {
            if !(price > 0.0) {
                return Err(BarError::NonPositivePrice(price));
            }
        }

        //validate strictly positive volume
        if !(volume > 0.0) {
            return Err(BarError::NonPositiveVolume(volume));
        }

        //validate high >= low
        if high < low {
            return Err(BarError::InvalidHighLow { high, low });
        }

        //validate close within [low, high]
        if close < low || close > high {
            return Err(BarError::InvalidClose { close, high, low });
        }

        //validate open within [low, high]
        if open < low || open > high {
            return Err(BarError::InvalidOpen { open, high, low });
        }

        Ok(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    //creates a Bar without validation
    pub fn new_unchecked(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    //true when every numeric field is finite and strictly positive
    pub fn has_positive_values(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}
