//! Session state shared between the feed tasks and the chart owner.

use std::sync::OnceLock;

use chrono::Utc;

use super::object::Candle;

/// Events flowing from the feed tasks into the chart owner.
///
/// Both the backfill task and the stream task write into the same channel;
/// the receiver applies them to the single candle series in arrival order.
#[derive(Debug, Clone)]
pub enum MarketEvent {
    /// Complete backfill batch, replaces the series content.
    History(Vec<Candle>),
    /// One still-forming candle from the stream, upserted by open time.
    Live(Candle),
}

/// Per-run feed state.
///
/// Holds the cutoff slot for the backfill request: the open time of the
/// first live candle wins, later writes are ignored. When nothing has been
/// recorded, the cutoff falls back to wall-clock time.
#[derive(Debug, Default)]
pub struct ChartSession {
    first_live_open_ms: OnceLock<i64>,
}

impl ChartSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the open time of a live candle, in milliseconds. First write
    /// wins.
    pub fn record_live_open(&self, start_ms: i64) {
        let _ = self.first_live_open_ms.set(start_ms);
    }

    /// Upper time bound for the historical fetch, in milliseconds.
    pub fn cutoff_ms(&self) -> i64 {
        self.first_live_open_ms
            .get()
            .copied()
            .unwrap_or_else(|| Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_first_write_wins() {
        let session = ChartSession::new();
        session.record_live_open(1_731_232_860_000);
        session.record_live_open(1_731_232_920_000);
        assert_eq!(session.cutoff_ms(), 1_731_232_860_000);
    }

    #[test]
    fn test_cutoff_defaults_to_wall_clock() {
        let session = ChartSession::new();
        let before = Utc::now().timestamp_millis();
        let cutoff = session.cutoff_ms();
        let after = Utc::now().timestamp_millis();
        assert!(cutoff >= before && cutoff <= after);
    }

    #[test]
    fn test_recorded_cutoff_beats_wall_clock() {
        // The backfill task reads whatever is in the slot at fetch time:
        // a live candle that landed first bounds the fetch, otherwise the
        // wall clock does. Whichever write is applied last to the series
        // wins for overlapping timestamps.
        let session = ChartSession::new();
        session.record_live_open(1_731_232_860_000);
        assert_eq!(session.cutoff_ms(), 1_731_232_860_000);
        assert!(session.cutoff_ms() < Utc::now().timestamp_millis());
    }
}
