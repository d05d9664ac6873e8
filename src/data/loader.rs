use crate::data::bar::Bar;
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use statrs::statistics::Statistics;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("Timestamps not strictly increasing at index {index}")]
    NonIncreasingTimestamp { index: usize },
    #[error("Non-positive or missing value in bar at index {index}")]
    NonPositiveValue { index: usize },
}

#[derive(Debug, Deserialize)]
struct CsvRecord {
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(alias = "volume")]
    vol: f64,
}

//loads bars from a csv file
//the timestamp column is a unix epoch in milliseconds
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut bars = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        //convert millisecond epoch to utc
        let timestamp = Utc
            .timestamp_millis_opt(record.timestamp)
            .single()
            .context(format!(
                "Failed to parse timestamp '{}' at line {}",
                record.timestamp,
                index + 2
            ))?;

        let bar = Bar::new_unchecked(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.vol,
        );

        bars.push(bar);
    }

    //sort by timestamp to ensure chronological order
    bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    Ok(bars)
}

//removes rows a backtest cannot use: bars with missing or non-positive
//values and duplicate timestamps (first occurrence wins)
//expects chronologically sorted input, as produced by load_csv
pub fn clean_bars(bars: Vec<Bar>) -> Vec<Bar> {
    let mut cleaned: Vec<Bar> = Vec::with_capacity(bars.len());

    for bar in bars {
        if !bar.has_positive_values() {
            continue;
        }

        if let Some(last) = cleaned.last() {
            if bar.timestamp == last.timestamp {
                continue;
            }
        }

        cleaned.push(bar);
    }

    cleaned
}

//checks the loader contract the engine relies on: strictly increasing
//timestamps and strictly positive prices and volume
pub fn validate_bars(bars: &[Bar]) -> Result<(), SeriesError> {
    for (index, bar) in bars.iter().enumerate() {
        if !bar.has_positive_values() {
            return Err(SeriesError::NonPositiveValue { index });
        }

        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(SeriesError::NonIncreasingTimestamp { index });
        }
    }

    Ok(())
}

//descriptive statistics over the close column
#[derive(Debug, Clone)]
pub struct DataSummary {
    pub bar_count: usize,
    pub first_timestamp: DateTime<Utc>,
    pub last_timestamp: DateTime<Utc>,
    pub close_min: f64,
    pub close_max: f64,
    pub close_mean: f64,
    pub close_std_dev: f64,
}

//summarizes a loaded series for console display; none for an empty series
pub fn describe(bars: &[Bar]) -> Option<DataSummary> {
    let first = bars.first()?;
    let last = bars.last()?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let closes = closes.as_slice();

    Some(DataSummary {
        bar_count: bars.len(),
        first_timestamp: first.timestamp,
        last_timestamp: last.timestamp,
        close_min: closes.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
        close_max: closes.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
        close_mean: closes.mean(),
        close_std_dev: closes.std_dev(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn ts(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().unwrap()
    }

    fn flat_bar(ms: i64, close: f64) -> Bar {
        Bar::new_unchecked(ts(ms), close, close, close, close, 1000.0)
    }

    fn write_csv(rows: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,open,high,low,close,vol").unwrap();
        write!(file, "{}", rows).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_and_sorts_csv() {
        //rows deliberately out of order
        let file = write_csv(
            "600000,101,102,100,101,50\n\
             0,100,101,99,100,40\n\
             300000,99,100,98,99,60\n",
        );

        let bars = load_csv(file.path()).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].timestamp, ts(0));
        assert_eq!(bars[1].timestamp, ts(300_000));
        assert_eq!(bars[2].timestamp, ts(600_000));
        assert_relative_eq!(bars[0].close, 100.0);
    }

    #[test]
    fn accepts_volume_header_alias() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
        writeln!(file, "0,100,101,99,100,40").unwrap();
        file.flush().unwrap();

        let bars = load_csv(file.path()).unwrap();
        assert_eq!(bars.len(), 1);
        assert_relative_eq!(bars[0].volume, 40.0);
    }

    #[test]
    fn clean_drops_duplicates_and_bad_rows() {
        let bars = vec![
            flat_bar(0, 100.0),
            flat_bar(300_000, 101.0),
            //duplicate timestamp, first occurrence wins
            flat_bar(300_000, 999.0),
            //non-positive close
            flat_bar(600_000, -3.0),
            //nan volume
            Bar::new_unchecked(ts(900_000), 102.0, 102.0, 102.0, 102.0, f64::NAN),
            flat_bar(1_200_000, 103.0),
        ];

        let cleaned = clean_bars(bars);

        assert_eq!(cleaned.len(), 3);
        assert_relative_eq!(cleaned[0].close, 100.0);
        assert_relative_eq!(cleaned[1].close, 101.0);
        assert_relative_eq!(cleaned[2].close, 103.0);
        assert!(validate_bars(&cleaned).is_ok());
    }

    #[test]
    fn validate_catches_non_increasing_timestamps() {
        let bars = vec![flat_bar(300_000, 100.0), flat_bar(0, 101.0)];
        assert!(matches!(
            validate_bars(&bars),
            Err(SeriesError::NonIncreasingTimestamp { index: 1 })
        ));
    }

    #[test]
    fn validate_catches_non_positive_values() {
        let bars = vec![flat_bar(0, 100.0), flat_bar(300_000, -1.0)];
        assert!(matches!(
            validate_bars(&bars),
            Err(SeriesError::NonPositiveValue { index: 1 })
        ));
    }

    #[test]
    fn describe_summarizes_closes() {
        let bars = vec![flat_bar(0, 100.0), flat_bar(300_000, 102.0), flat_bar(600_000, 104.0)];

        let summary = describe(&bars).unwrap();

        assert_eq!(summary.bar_count, 3);
        assert_eq!(summary.first_timestamp, ts(0));
        assert_eq!(summary.last_timestamp, ts(600_000));
        assert_relative_eq!(summary.close_min, 100.0);
        assert_relative_eq!(summary.close_max, 104.0);
        assert_relative_eq!(summary.close_mean, 102.0);
        assert_relative_eq!(summary.close_std_dev, 2.0);
    }

    #[test]
    fn describe_empty_is_none() {
        assert!(describe(&[]).is_none());
    }
}
