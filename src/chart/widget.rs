//! Chart widget with crosshair cursor, zoom, and pan support.

use egui::{Color32, Key, Pos2, Rect, Response, Sense, Stroke, StrokeKind, Ui, Vec2};

use super::base::{
    calculate_axis_ticks, format_price, ohlc_summary, AXIS_X_HEIGHT, AXIS_Y_WIDTH,
    BACKGROUND_COLOR, CURSOR_COLOR, GREY_COLOR, MARGIN, MIN_BAR_COUNT, TEXT_COLOR,
};
use super::item::CandleItem;
use super::manager::CandleSeries;
use crate::market::Candle;

/// Main chart widget
pub struct ChartWidget {
    /// Candle series store
    pub series: CandleSeries,
    /// Candlestick item
    candle_item: CandleItem,
    /// Cursor state
    cursor: ChartCursor,
    /// Index of the rightmost visible candle
    right_ix: usize,
    /// Number of visible candles
    bar_count: usize,
    /// Price decimal places
    price_decimals: usize,
}

impl Default for ChartWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartWidget {
    /// Create a new chart widget
    pub fn new() -> Self {
        Self {
            series: CandleSeries::new(),
            candle_item: CandleItem::new(),
            cursor: ChartCursor::new(),
            right_ix: 0,
            bar_count: 100,
            price_decimals: 2,
        }
    }

    /// Set the price decimal places
    pub fn set_price_decimals(&mut self, decimals: usize) {
        self.price_decimals = decimals;
    }

    /// Load the backfill batch and snap the view to the newest candle.
    pub fn set_history(&mut self, history: Vec<Candle>) {
        self.series.set_data(history);
        self.move_to_right();
    }

    /// Apply one live update.
    pub fn update_candle(&mut self, candle: Candle) {
        self.series.update(candle);

        // Auto-scroll if near the right edge
        if self.right_ix >= self.series.len().saturating_sub(self.bar_count / 2) {
            self.move_to_right();
        }
    }

    /// Move chart to the rightmost position
    pub fn move_to_right(&mut self) {
        self.right_ix = self.series.len();
    }

    /// Get the visible candle range
    fn visible_range(&self) -> (usize, usize) {
        let max_ix = self.right_ix.min(self.series.len());
        let min_ix = max_ix.saturating_sub(self.bar_count);
        (min_ix, max_ix.saturating_sub(1))
    }

    /// Handle keyboard input
    fn handle_keyboard(&mut self, ui: &Ui) {
        let count = self.series.len();

        if ui.input(|i| i.key_pressed(Key::ArrowLeft)) {
            self.right_ix = self.right_ix.saturating_sub(1).max(self.bar_count);
        }

        if ui.input(|i| i.key_pressed(Key::ArrowRight)) {
            self.right_ix = (self.right_ix + 1).min(count);
        }

        if ui.input(|i| i.key_pressed(Key::ArrowUp)) {
            // Zoom in
            self.bar_count = (self.bar_count as f32 / 1.2) as usize;
            self.bar_count = self.bar_count.max(MIN_BAR_COUNT);
        }

        if ui.input(|i| i.key_pressed(Key::ArrowDown)) {
            // Zoom out
            self.bar_count = (self.bar_count as f32 * 1.2) as usize;
            self.bar_count = self.bar_count.min(count.max(MIN_BAR_COUNT));
        }

        if ui.input(|i| i.key_pressed(Key::Home)) {
            self.right_ix = self.bar_count;
        }

        if ui.input(|i| i.key_pressed(Key::End)) {
            self.move_to_right();
        }
    }

    /// Handle mouse wheel for zooming
    fn handle_scroll(&mut self, ui: &Ui) {
        let scroll_delta = ui.input(|i| i.raw_scroll_delta);
        if scroll_delta.y != 0.0 {
            let count = self.series.len();
            if scroll_delta.y > 0.0 {
                self.bar_count = (self.bar_count as f32 * 1.1) as usize;
                self.bar_count = self.bar_count.min(count.max(MIN_BAR_COUNT));
            } else {
                self.bar_count = (self.bar_count as f32 / 1.1) as usize;
                self.bar_count = self.bar_count.max(MIN_BAR_COUNT);
            }
        }
    }

    /// Handle mouse drag for panning
    fn handle_drag(&mut self, response: &Response, candle_rect: Rect) {
        if response.dragged() {
            let delta = response.drag_delta();
            if delta.x != 0.0 {
                let bar_pixel_width = candle_rect.width() / self.bar_count as f32;
                let bar_delta = (-delta.x / bar_pixel_width) as i32;

                let count = self.series.len();
                let new_right = (self.right_ix as i32 + bar_delta).max(0) as usize;
                self.right_ix = new_right.clamp(self.bar_count.min(count), count);
            }
        }
    }

    /// Show the chart widget
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());

        if response.clicked() {
            response.request_focus();
        }

        if response.has_focus() {
            self.handle_keyboard(ui);
        }
        self.handle_scroll(ui);

        let rect = response.rect;
        painter.rect_filled(rect, 0.0, BACKGROUND_COLOR);

        let candle_rect = Rect::from_min_max(
            Pos2::new(rect.left() + MARGIN, rect.top() + MARGIN),
            Pos2::new(
                rect.right() - MARGIN - AXIS_Y_WIDTH,
                rect.bottom() - MARGIN - AXIS_X_HEIGHT,
            ),
        );

        self.handle_drag(&response, candle_rect);

        if self.series.is_empty() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No data",
                egui::FontId::proportional(20.0),
                GREY_COLOR,
            );
            return response;
        }

        let (min_ix, max_ix) = self.visible_range();

        let (price_min, price_max) = self.series.price_range(min_ix, max_ix);
        let price_padding = (price_max - price_min) * 0.05;
        let price_min = price_min - price_padding;
        let price_max = price_max + price_padding;

        // Draw candle chart
        self.candle_item
            .draw(ui, &self.series, candle_rect, min_ix, max_ix, price_min, price_max);

        // Draw chart border
        painter.rect_stroke(candle_rect, 0.0, Stroke::new(1.0, GREY_COLOR), StrokeKind::Inside);

        // Draw axes
        self.draw_y_axis(ui, candle_rect, price_min, price_max);
        self.draw_x_axis(ui, candle_rect, min_ix, max_ix);

        // Handle cursor
        if let Some(hover_pos) = response.hover_pos() {
            self.cursor.update_position(
                hover_pos,
                candle_rect,
                min_ix,
                max_ix,
                price_min,
                price_max,
            );
            self.cursor.draw(
                ui,
                &self.series,
                candle_rect,
                min_ix,
                max_ix,
                self.price_decimals,
            );
        } else {
            self.cursor.clear();
        }

        response
    }

    /// Draw Y-axis with price tick labels
    fn draw_y_axis(&self, ui: &mut Ui, chart_rect: Rect, min_val: f64, max_val: f64) {
        let painter = ui.painter();
        let axis_rect = Rect::from_min_max(
            Pos2::new(chart_rect.right(), chart_rect.top()),
            Pos2::new(chart_rect.right() + AXIS_Y_WIDTH, chart_rect.bottom()),
        );

        let ticks = calculate_axis_ticks(min_val, max_val, 5);

        for tick in ticks {
            let normalized = (tick - min_val) / (max_val - min_val);
            let y = chart_rect.bottom() - (normalized as f32 * chart_rect.height());

            painter.line_segment(
                [
                    Pos2::new(chart_rect.right(), y),
                    Pos2::new(chart_rect.right() + 4.0, y),
                ],
                Stroke::new(1.0, GREY_COLOR),
            );

            painter.text(
                Pos2::new(axis_rect.left() + 6.0, y),
                egui::Align2::LEFT_CENTER,
                format_price(tick, self.price_decimals),
                egui::FontId::proportional(11.0),
                TEXT_COLOR,
            );
        }
    }

    /// Draw X-axis with datetime labels
    fn draw_x_axis(&self, ui: &mut Ui, chart_rect: Rect, min_ix: usize, max_ix: usize) {
        let painter = ui.painter();

        let bar_count = max_ix - min_ix + 1;
        let num_ticks = ((chart_rect.width() / 120.0) as usize).max(2);
        let tick_step = (bar_count / num_ticks).max(1);

        for i in 0..=num_ticks {
            let ix = min_ix + (i * tick_step).min(bar_count.saturating_sub(1));

            if let Some(candle) = self.series.get(ix) {
                let normalized = (ix - min_ix) as f32 / bar_count as f32;
                let x = chart_rect.left() + normalized * chart_rect.width();
                let y = chart_rect.bottom();

                painter.line_segment(
                    [Pos2::new(x, y), Pos2::new(x, y + 4.0)],
                    Stroke::new(1.0, GREY_COLOR),
                );

                let label = candle.datetime().format("%m-%d %H:%M").to_string();
                painter.text(
                    Pos2::new(x, y + 6.0),
                    egui::Align2::CENTER_TOP,
                    label,
                    egui::FontId::proportional(10.0),
                    TEXT_COLOR,
                );
            }
        }
    }
}

/// Crosshair cursor and OHLC tooltip
pub struct ChartCursor {
    /// Current X position (candle index)
    x: usize,
    /// Current Y position (price)
    y: f64,
    /// Current screen position
    screen_pos: Pos2,
    /// Whether cursor is inside the chart area
    visible: bool,
}

impl Default for ChartCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartCursor {
    pub fn new() -> Self {
        Self {
            x: 0,
            y: 0.0,
            screen_pos: Pos2::ZERO,
            visible: false,
        }
    }

    pub fn clear(&mut self) {
        self.visible = false;
    }

    pub fn update_position(
        &mut self,
        pos: Pos2,
        candle_rect: Rect,
        min_ix: usize,
        max_ix: usize,
        price_min: f64,
        price_max: f64,
    ) {
        self.screen_pos = pos;
        self.visible = candle_rect.contains(pos);

        if !self.visible {
            return;
        }

        // Calculate candle index from X position
        let bar_count = max_ix - min_ix + 1;
        let bar_pixel_width = candle_rect.width() / bar_count as f32;
        let relative_x = pos.x - candle_rect.left();
        let bar_offset = (relative_x / bar_pixel_width) as usize;
        self.x = (min_ix + bar_offset).min(max_ix);

        // Calculate price from Y position
        let normalized = 1.0 - (pos.y - candle_rect.top()) / candle_rect.height();
        self.y = price_min + (normalized as f64) * (price_max - price_min);
    }

    pub fn draw(
        &self,
        ui: &mut Ui,
        series: &CandleSeries,
        candle_rect: Rect,
        min_ix: usize,
        max_ix: usize,
        price_decimals: usize,
    ) {
        if !self.visible {
            return;
        }

        // Tooltip and crosshair are hidden when there is no candle under
        // the pointer.
        let Some(candle) = series.get(self.x) else {
            return;
        };

        let painter = ui.painter();
        let stroke = Stroke::new(1.0, CURSOR_COLOR);

        // Vertical line through the hovered candle
        let bar_count = max_ix - min_ix + 1;
        let bar_pixel_width = candle_rect.width() / bar_count as f32;
        let bar_x = candle_rect.left()
            + (self.x - min_ix) as f32 * bar_pixel_width
            + bar_pixel_width * 0.5;
        painter.line_segment(
            [
                Pos2::new(bar_x, candle_rect.top()),
                Pos2::new(bar_x, candle_rect.bottom()),
            ],
            stroke,
        );

        // Horizontal line at the pointer
        painter.line_segment(
            [
                Pos2::new(candle_rect.left(), self.screen_pos.y),
                Pos2::new(candle_rect.right(), self.screen_pos.y),
            ],
            stroke,
        );

        // Price label on the Y-axis
        let price_label = format_price(self.y, price_decimals);
        let label_pos = Pos2::new(candle_rect.right() + 4.0, self.screen_pos.y);
        let text_size = ui.fonts_mut(|f| f.glyph_width(&egui::FontId::proportional(11.0), ' '))
            * price_label.len() as f32;
        let label_rect = Rect::from_min_size(
            Pos2::new(label_pos.x, label_pos.y - 8.0),
            Vec2::new(text_size + 8.0, 16.0),
        );
        painter.rect_filled(label_rect, 2.0, CURSOR_COLOR);
        painter.text(
            label_pos,
            egui::Align2::LEFT_CENTER,
            price_label,
            egui::FontId::proportional(11.0),
            Color32::BLACK,
        );

        // Datetime label on the X-axis
        let datetime_label = candle.datetime().format("%Y-%m-%d %H:%M").to_string();
        let text_size = ui.fonts_mut(|f| f.glyph_width(&egui::FontId::proportional(11.0), ' '))
            * datetime_label.len() as f32;
        let label_rect = Rect::from_min_size(
            Pos2::new(bar_x - text_size * 0.5, candle_rect.bottom() + 4.0),
            Vec2::new(text_size, 16.0),
        );
        painter.rect_filled(label_rect, 2.0, CURSOR_COLOR);
        painter.text(
            Pos2::new(bar_x, candle_rect.bottom() + 12.0),
            egui::Align2::CENTER_CENTER,
            datetime_label,
            egui::FontId::proportional(10.0),
            Color32::BLACK,
        );

        // OHLC tooltip overlay
        let tooltip = ohlc_summary(candle);
        let tooltip_pos = Pos2::new(candle_rect.left() + 8.0, candle_rect.top() + 8.0);
        let text_size = ui.fonts_mut(|f| f.glyph_width(&egui::FontId::proportional(12.0), ' '))
            * tooltip.len() as f32;
        let tooltip_rect = Rect::from_min_size(
            Pos2::new(tooltip_pos.x - 4.0, tooltip_pos.y - 4.0),
            Vec2::new(text_size + 8.0, 20.0),
        );
        painter.rect_filled(
            tooltip_rect,
            2.0,
            Color32::from_rgba_unmultiplied(0, 0, 0, 200),
        );
        painter.text(
            tooltip_pos,
            egui::Align2::LEFT_TOP,
            tooltip,
            egui::FontId::proportional(12.0),
            Color32::WHITE,
        );
    }
}
