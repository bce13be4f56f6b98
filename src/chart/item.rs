//! Chart items for rendering candlesticks.

use egui::{Pos2, Rect, Stroke, Ui};

use super::base::{BAR_WIDTH, DOWN_COLOR, STAY_COLOR, UP_COLOR};
use super::manager::CandleSeries;

/// Candlestick chart item
pub struct CandleItem;

impl Default for CandleItem {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleItem {
    pub fn new() -> Self {
        Self
    }

    /// Convert price to screen Y coordinate
    fn price_to_y(&self, price: f64, rect: Rect, y_min: f64, y_max: f64) -> f32 {
        let y_range = y_max - y_min;
        if y_range == 0.0 {
            return rect.center().y;
        }
        let normalized = (price - y_min) / y_range;
        rect.bottom() - (normalized as f32 * rect.height())
    }

    /// Convert candle index to screen X coordinate
    fn index_to_x(&self, ix: usize, rect: Rect, min_ix: usize, max_ix: usize) -> f32 {
        let bar_count = (max_ix - min_ix + 1) as f32;
        let bar_width = rect.width() / bar_count;
        rect.left() + (ix - min_ix) as f32 * bar_width + bar_width * 0.5
    }

    /// Draw the visible candles
    pub fn draw(
        &self,
        ui: &mut Ui,
        series: &CandleSeries,
        rect: Rect,
        min_ix: usize,
        max_ix: usize,
        y_min: f64,
        y_max: f64,
    ) {
        let painter = ui.painter();
        let bar_count = (max_ix - min_ix + 1) as f32;
        let bar_pixel_width = rect.width() / bar_count;
        let candle_width = (bar_pixel_width * BAR_WIDTH * 2.0).max(1.0);

        for ix in min_ix..=max_ix {
            if let Some(candle) = series.get(ix) {
                let x = self.index_to_x(ix, rect, min_ix, max_ix);

                let color = if candle.close > candle.open {
                    UP_COLOR
                } else if candle.close < candle.open {
                    DOWN_COLOR
                } else {
                    STAY_COLOR
                };

                let stroke = Stroke::new(1.0, color);

                // Draw high-low line (wick)
                let high_y = self.price_to_y(candle.high, rect, y_min, y_max);
                let low_y = self.price_to_y(candle.low, rect, y_min, y_max);
                painter.line_segment([Pos2::new(x, high_y), Pos2::new(x, low_y)], stroke);

                // Draw candle body
                let open_y = self.price_to_y(candle.open, rect, y_min, y_max);
                let close_y = self.price_to_y(candle.close, rect, y_min, y_max);

                if (open_y - close_y).abs() < 1.0 {
                    // Draw a horizontal line for doji
                    painter.line_segment(
                        [
                            Pos2::new(x - candle_width * 0.5, open_y),
                            Pos2::new(x + candle_width * 0.5, open_y),
                        ],
                        stroke,
                    );
                } else {
                    let body_rect = Rect::from_min_max(
                        Pos2::new(x - candle_width * 0.5, open_y.min(close_y)),
                        Pos2::new(x + candle_width * 0.5, open_y.max(close_y)),
                    );
                    painter.rect_filled(body_rect, 0.0, color);
                }
            }
        }
    }
}
