use crate::data::Bar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//a bar annotated with the trailing rolling mean of the close price
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreparedBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub mean: f64,
}

//number of bars in the trailing mean window
//the +1 keeps the very first mean defined instead of starting with a gap
pub fn window_size(mean_period_in_hours: f64, bar_duration_in_minutes: f64) -> usize {
    ((mean_period_in_hours * 60.0) / bar_duration_in_minutes).floor() as usize + 1
}

//annotates each bar with the arithmetic mean of close over the trailing
//window ending at that bar, accepting however many bars are available
//near the start: mean[0] always equals close[0]
//window must be at least 1; config validation guarantees that upstream
pub fn prepare_bars(bars: &[Bar], window: usize) -> Vec<PreparedBar> {
    let mut prepared = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= window {
            window_sum -= bars[i - window].close;
        }

        let bars_in_window = (i + 1).min(window);
        let mean = window_sum / bars_in_window as f64;

        prepared.push(PreparedBar {
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            mean,
        });
    }

    prepared
}
