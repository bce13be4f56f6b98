//! eframe application shell that owns the chart and drains feed events.

use eframe::egui;
use tokio::sync::mpsc;
use tracing::info;

use crate::chart::ChartWidget;
use crate::market::{Interval, MarketEvent};

/// Application state: the chart widget plus the feed event receiver.
///
/// Both feed tasks write into the same channel; this is the only place the
/// series is mutated, so no locking is needed around the chart.
pub struct ChartApp {
    chart: ChartWidget,
    events: mpsc::UnboundedReceiver<MarketEvent>,
    symbol: String,
    interval: Interval,
}

impl ChartApp {
    /// Create a new application instance
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        events: mpsc::UnboundedReceiver<MarketEvent>,
    ) -> Self {
        let mut chart = ChartWidget::new();
        chart.set_price_decimals(2);

        Self {
            chart,
            events,
            symbol: symbol.into(),
            interval,
        }
    }

    /// Apply all pending feed events to the chart.
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                MarketEvent::History(candles) => {
                    info!("loaded {} historical candles", candles.len());
                    self.chart.set_history(candles);
                }
                MarketEvent::Live(candle) => {
                    self.chart.update_candle(candle);
                }
            }
        }
    }
}

impl eframe::App for ChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::TopBottomPanel::top("chart_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(format!("{} · {}", self.symbol, self.interval.value()));
                ui.separator();
                ui.label(format!("{} candles", self.chart.series.len()));
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart.show(ui);
        });

        // Poll the feed channel on a steady tick
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
