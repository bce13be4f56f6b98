//! Candle series store for the chart.
//!
//! Keeps the single candle series ordered by open time and provides the two
//! write paths the feed uses: bulk replace for the backfill and upsert for
//! live updates.

use std::collections::HashMap;

use crate::market::Candle;

/// Ordered candle series keyed by open time (unix seconds).
///
/// Invariant: stored times are strictly increasing. Non-finite candles are
/// rejected at both write paths.
pub struct CandleSeries {
    /// Ordered list of candles
    ordered: Vec<Candle>,
    /// Map from open time to index
    time_index: HashMap<i64, usize>,
}

impl Default for CandleSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleSeries {
    /// Create a new CandleSeries
    pub fn new() -> Self {
        Self {
            ordered: Vec::new(),
            time_index: HashMap::new(),
        }
    }

    /// Replace the whole series with one backfill batch.
    ///
    /// The provider sends newest-first; the batch is sorted ascending here.
    /// Duplicate times keep the later entry. Prior content is discarded,
    /// including live updates applied before the backfill landed; the next
    /// stream tick re-appends the forming candle.
    pub fn set_data(&mut self, candles: Vec<Candle>) {
        self.ordered.clear();
        self.time_index.clear();

        let mut sorted: Vec<Candle> = candles.into_iter().filter(|c| c.is_finite()).collect();
        sorted.sort_by_key(|c| c.time);

        for candle in sorted {
            match self.time_index.get(&candle.time) {
                Some(&ix) => self.ordered[ix] = candle,
                None => {
                    self.time_index.insert(candle.time, self.ordered.len());
                    self.ordered.push(candle);
                }
            }
        }
    }

    /// Upsert one candle by open time.
    ///
    /// A known time replaces that point, a newer time appends. An unknown
    /// time older than the series tail is discarded to keep the time axis
    /// strictly increasing.
    pub fn update(&mut self, candle: Candle) {
        if !candle.is_finite() {
            return;
        }

        if let Some(&ix) = self.time_index.get(&candle.time) {
            self.ordered[ix] = candle;
            return;
        }

        if let Some(last) = self.ordered.last() {
            if candle.time < last.time {
                tracing::warn!("discarding out-of-order candle at {}", candle.time);
                return;
            }
        }

        self.time_index.insert(candle.time, self.ordered.len());
        self.ordered.push(candle);
    }

    /// Get total number of candles
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Get candle at an index
    pub fn get(&self, ix: usize) -> Option<&Candle> {
        self.ordered.get(ix)
    }

    /// Get all candles in time order
    pub fn candles(&self) -> &[Candle] {
        &self.ordered
    }

    /// Min/max price over the index range, wicks included.
    pub fn price_range(&self, min_ix: usize, max_ix: usize) -> (f64, f64) {
        if self.ordered.is_empty() {
            return (0.0, 1.0);
        }

        let max_ix = max_ix.min(self.ordered.len().saturating_sub(1));
        if min_ix > max_ix {
            return (0.0, 1.0);
        }

        let candles = &self.ordered[min_ix..=max_ix];
        let mut min_price = candles[0].low;
        let mut max_price = candles[0].high;

        for candle in candles.iter().skip(1) {
            min_price = min_price.min(candle.low);
            max_price = max_price.max(candle.high);
        }

        (min_price, max_price)
    }

    /// Clear all data
    pub fn clear(&mut self) {
        self.ordered.clear();
        self.time_index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(time: i64, open: f64, close: f64) -> Candle {
        let high = open.max(close) + 1.0;
        let low = open.min(close) - 1.0;
        Candle::new(time, open, high, low, close)
    }

    #[test]
    fn test_set_data_sorts_newest_first_batch() {
        let mut series = CandleSeries::new();
        series.set_data(vec![
            candle(180, 102.0, 103.0),
            candle(120, 101.0, 102.0),
            candle(60, 100.0, 101.0),
        ]);

        assert_eq!(series.len(), 3);
        let times: Vec<i64> = series.candles().iter().map(|c| c.time).collect();
        assert_eq!(times, vec![60, 120, 180]);
    }

    #[test]
    fn test_set_data_replaces_prior_content() {
        let mut series = CandleSeries::new();
        series.set_data(vec![candle(60, 100.0, 101.0)]);
        series.set_data(vec![candle(120, 101.0, 102.0), candle(180, 102.0, 103.0)]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.get(0).unwrap().time, 120);
    }

    #[test]
    fn test_set_data_drops_non_finite_and_dedups() {
        let mut series = CandleSeries::new();
        series.set_data(vec![
            Candle::new(60, f64::NAN, 101.0, 99.0, 100.0),
            candle(120, 101.0, 102.0),
            Candle::new(120, 101.0, 103.0, 100.0, 102.5),
        ]);

        assert_eq!(series.len(), 1);
        // The later duplicate wins.
        assert_eq!(series.get(0).unwrap().close, 102.5);
    }

    #[test]
    fn test_update_same_time_replaces_last_point() {
        let mut series = CandleSeries::new();
        series.update(candle(60, 100.0, 100.2));
        series.update(candle(60, 100.0, 100.8));

        assert_eq!(series.len(), 1);
        assert_eq!(series.get(0).unwrap().close, 100.8);
    }

    #[test]
    fn test_update_newer_time_appends() {
        let mut series = CandleSeries::new();
        series.update(candle(60, 100.0, 100.5));
        series.update(candle(120, 100.5, 101.0));

        assert_eq!(series.len(), 2);
        let times: Vec<i64> = series.candles().iter().map(|c| c.time).collect();
        assert_eq!(times, vec![60, 120]);
    }

    #[test]
    fn test_update_non_finite_dropped() {
        let mut series = CandleSeries::new();
        series.update(Candle::new(60, 100.0, f64::NEG_INFINITY, 99.0, 100.5));
        assert!(series.is_empty());
    }

    #[test]
    fn test_update_unknown_older_time_discarded() {
        let mut series = CandleSeries::new();
        series.update(candle(120, 100.0, 100.5));
        series.update(candle(60, 99.0, 99.5));

        assert_eq!(series.len(), 1);
        assert_eq!(series.get(0).unwrap().time, 120);
    }

    #[test]
    fn test_backfill_overwrites_live_updates() {
        // The backfill is a full replace: a live candle applied before the
        // history arrived is wiped and only restored by the next stream
        // tick. Whichever write lands last wins for overlapping times.
        let mut series = CandleSeries::new();
        series.update(candle(180, 102.0, 102.4));

        series.set_data(vec![candle(120, 101.0, 102.0), candle(60, 100.0, 101.0)]);
        assert_eq!(series.len(), 2);
        assert!(series.candles().iter().all(|c| c.time != 180));

        series.update(candle(180, 102.0, 102.6));
        assert_eq!(series.len(), 3);
        assert_eq!(series.get(2).unwrap().close, 102.6);
    }

    #[test]
    fn test_price_range_includes_wicks() {
        let mut series = CandleSeries::new();
        series.set_data(vec![candle(60, 100.0, 102.0), candle(120, 102.0, 108.0)]);

        let (min_price, max_price) = series.price_range(0, 1);
        assert_eq!(min_price, 99.0);
        assert_eq!(max_price, 109.0);
    }

    #[test]
    fn test_price_range_empty_series() {
        let series = CandleSeries::new();
        assert_eq!(series.price_range(0, 10), (0.0, 1.0));
    }
}
