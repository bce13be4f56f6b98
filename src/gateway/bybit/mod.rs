//! Bybit exchange gateway.
//!
//! Public market data only:
//! - One-shot kline history fetch (BybitRestClient)
//! - Kline stream subscription (BybitWebsocketClient)

mod constants;
mod rest_client;
mod websocket_client;

pub use constants::*;
pub use rest_client::BybitRestClient;
pub use websocket_client::BybitWebsocketClient;
