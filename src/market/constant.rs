//! General constant enums used across the chart application.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Candle interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// 1 minute
    Minute,
    /// 1 hour
    Hour,
    /// Daily
    Daily,
}

impl Interval {
    /// Get interval value string
    pub fn value(&self) -> &'static str {
        match self {
            Interval::Minute => "1m",
            Interval::Hour => "1h",
            Interval::Daily => "1d",
        }
    }

    /// Display name for UI labels
    pub fn display_name(&self) -> &'static str {
        match self {
            Interval::Minute => "1 Minute",
            Interval::Hour => "1 Hour",
            Interval::Daily => "Daily",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
