//! Market data structures shared by the gateway and the chart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Candlestick data for one interval of a trading pair.
///
/// `time` is the candle's open time in unix seconds, which is also the key
/// the chart series stores points under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Create a new Candle
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }

    /// Whether all four price fields are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
    }

    /// Candle open time as UTC datetime, for axis and cursor labels.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.time, 0).unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_finite() {
        let candle = Candle::new(1_731_232_860, 100.0, 106.0, 99.0, 105.0);
        assert!(candle.is_finite());

        let bad = Candle::new(1_731_232_860, f64::NAN, 106.0, 99.0, 105.0);
        assert!(!bad.is_finite());

        let bad = Candle::new(1_731_232_860, 100.0, f64::INFINITY, 99.0, 105.0);
        assert!(!bad.is_finite());
    }

    #[test]
    fn test_datetime_from_open_time() {
        let candle = Candle::new(1_731_232_860, 100.0, 106.0, 99.0, 105.0);
        assert_eq!(candle.datetime().timestamp(), 1_731_232_860);
    }
}
