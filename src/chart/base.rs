//! Base constants and utility functions for the chart module.

use egui::Color32;

use crate::market::Candle;

// Chart colors (dark theme)
pub const BACKGROUND_COLOR: Color32 = Color32::from_rgb(0, 0, 0);
pub const TEXT_COLOR: Color32 = Color32::from_rgb(0x59, 0x56, 0x56);
pub const GREY_COLOR: Color32 = Color32::from_rgb(100, 100, 100);

// Price movement colors
pub const UP_COLOR: Color32 = Color32::from_rgb(0x26, 0xa6, 0x9a);
pub const DOWN_COLOR: Color32 = Color32::from_rgb(0xef, 0x53, 0x50);
pub const STAY_COLOR: Color32 = Color32::from_rgb(255, 255, 255);

// Crosshair color
pub const CURSOR_COLOR: Color32 = Color32::from_rgb(0xaf, 0xaa, 0xaf);

// Chart dimensions
pub const BAR_WIDTH: f32 = 0.3;
pub const MIN_BAR_COUNT: usize = 20;

// Layout constants
pub const MARGIN: f32 = 5.0;
pub const AXIS_X_HEIGHT: f32 = 32.0;
pub const AXIS_Y_WIDTH: f32 = 80.0;

/// Format price with fixed decimal places
pub fn format_price(price: f64, decimals: usize) -> String {
    format!("{:.prec$}", price, prec = decimals)
}

/// One-line OHLC summary shown by the hover tooltip.
///
/// The trailing pair is the close-vs-open difference, absolute and as a
/// percentage of the open.
pub fn ohlc_summary(candle: &Candle) -> String {
    let diff = candle.close - candle.open;
    let pct = if candle.open != 0.0 {
        diff / candle.open * 100.0
    } else {
        0.0
    };

    format!(
        "O: {:.2} H: {:.2} L: {:.2} C: {:.2} {:.2} ({:.2}%)",
        candle.open, candle.high, candle.low, candle.close, diff, pct
    )
}

/// Calculate nice axis tick values
pub fn calculate_axis_ticks(min_val: f64, max_val: f64, max_ticks: usize) -> Vec<f64> {
    if min_val >= max_val {
        return vec![min_val];
    }

    let range = max_val - min_val;
    let rough_step = range / max_ticks as f64;

    // Find the magnitude of the step
    let magnitude = 10.0_f64.powf(rough_step.log10().floor());
    let residual = rough_step / magnitude;

    // Choose a nice step value
    let nice_step = if residual <= 1.5 {
        magnitude
    } else if residual <= 3.0 {
        2.0 * magnitude
    } else if residual <= 7.0 {
        5.0 * magnitude
    } else {
        10.0 * magnitude
    };

    // Generate tick values
    let mut ticks = Vec::new();
    let start = (min_val / nice_step).ceil() * nice_step;
    let mut value = start;

    while value <= max_val {
        ticks.push(value);
        value += nice_step;
    }

    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ohlc_summary() {
        let candle = Candle::new(1_731_232_860, 100.0, 106.0, 99.0, 105.0);
        assert_eq!(
            ohlc_summary(&candle),
            "O: 100.00 H: 106.00 L: 99.00 C: 105.00 5.00 (5.00%)"
        );
    }

    #[test]
    fn test_ohlc_summary_negative_move() {
        let candle = Candle::new(1_731_232_860, 105.0, 106.0, 99.0, 100.0);
        assert_eq!(
            ohlc_summary(&candle),
            "O: 105.00 H: 106.00 L: 99.00 C: 100.00 -5.00 (-4.76%)"
        );
    }

    #[test]
    fn test_ohlc_summary_zero_open() {
        let candle = Candle::new(1_731_232_860, 0.0, 1.0, 0.0, 0.5);
        assert_eq!(ohlc_summary(&candle), "O: 0.00 H: 1.00 L: 0.00 C: 0.50 0.50 (0.00%)");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(105.456, 2), "105.46");
        assert_eq!(format_price(105.0, 4), "105.0000");
    }

    #[test]
    fn test_calculate_axis_ticks() {
        let ticks = calculate_axis_ticks(0.0, 100.0, 5);
        assert!(!ticks.is_empty());
        for tick in &ticks {
            assert!(*tick >= 0.0 && *tick <= 100.0);
        }
    }
}
