//! Kline Chart - live candlestick chart for a single trading pair
//!
//! This crate renders a live minute-candle chart, seeded from Bybit's public
//! kline endpoint and kept current via the public spot stream:
//!
//! - Market data types and feed session state
//! - Bybit gateway (REST backfill + websocket stream)
//! - Candlestick chart widget (with `gui` feature)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kline_chart::{BybitWebsocketClient, ChartSession, Interval, MarketEvent};
//!
//! #[tokio::main]
//! async fn main() {
//!     let session = Arc::new(ChartSession::new());
//!     let (tx, _rx) = tokio::sync::mpsc::unbounded_channel::<MarketEvent>();
//!
//!     let stream = BybitWebsocketClient::new("BTCUSDT", Interval::Minute, session, tx);
//!     // stream.run().await;
//! }
//! ```

pub mod gateway;
pub mod market;

#[cfg(feature = "gui")]
pub mod app;
#[cfg(feature = "gui")]
pub mod chart;

// Re-export commonly used types
pub use gateway::bybit::{BybitRestClient, BybitWebsocketClient};
pub use gateway::GatewayError;
pub use market::{Candle, ChartSession, Interval, MarketEvent};

#[cfg(feature = "gui")]
pub use chart::{CandleSeries, ChartWidget};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
