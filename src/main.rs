//! Kline Chart - Main Application Entry Point
//!
//! Seeds a candlestick chart for one trading pair from Bybit's kline REST
//! endpoint and keeps it current from the public spot stream.

use std::error::Error;
use std::sync::Arc;

use eframe::egui;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kline_chart::app::ChartApp;
use kline_chart::gateway::bybit::{BybitRestClient, BybitWebsocketClient};
use kline_chart::market::{ChartSession, Interval, MarketEvent};

/// Trading pair shown by the chart
const SYMBOL: &str = "BTCUSDT";

/// Candle interval of the series
const INTERVAL: Interval = Interval::Minute;

/// Initialize logging system
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create native window options
fn create_native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Kline Chart")
            .with_inner_size([1200.0, 600.0])
            .with_min_inner_size([600.0, 300.0]),
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Create tokio runtime for the feed tasks
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    setup_logging();

    info!(
        "starting kline chart: {} ({})",
        SYMBOL,
        INTERVAL.display_name()
    );

    let session = Arc::new(ChartSession::new());
    let (events_tx, events_rx) = mpsc::unbounded_channel::<MarketEvent>();

    // Live stream: fire-and-forget, the read loop runs until the process
    // exits. Connection failures are logged and the chart stays on
    // historical data only.
    {
        let stream =
            BybitWebsocketClient::new(SYMBOL, INTERVAL, session.clone(), events_tx.clone());
        runtime.spawn(async move {
            if let Err(e) = stream.run().await {
                error!("stream connection failed: {}", e);
            }
        });
    }

    // One backfill, bounded by the first live candle's open time when one
    // already arrived, else by the wall clock. On failure the series is
    // left empty; no retry.
    {
        let session = session.clone();
        let events = events_tx;
        runtime.spawn(async move {
            let end_ms = session.cutoff_ms();
            let client = BybitRestClient::new();
            match client.query_kline_history(SYMBOL, INTERVAL, end_ms).await {
                Ok(candles) => {
                    info!("history fetch returned {} candles", candles.len());
                    if events.send(MarketEvent::History(candles)).is_err() {
                        error!("event channel closed before history load");
                    }
                }
                Err(e) => error!("history fetch failed: {}", e),
            }
        });
    }

    eframe::run_native(
        "Kline Chart",
        create_native_options(),
        Box::new(move |_cc| Ok(Box::new(ChartApp::new(SYMBOL, INTERVAL, events_rx)))),
    )
    .map_err(|e| format!("Failed to run application: {}", e))?;

    Ok(())
}
