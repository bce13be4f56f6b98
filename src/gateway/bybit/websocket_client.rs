//! Bybit public stream websocket client.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use super::constants::{kline_topic, SPOT_WS_HOST};
use crate::gateway::{de_string_to_f64, GatewayError};
use crate::market::{Candle, ChartSession, Interval, MarketEvent};

/// One kline entry from the stream payload.
#[derive(Debug, Clone, Deserialize)]
struct StreamKline {
    start: i64,
    #[serde(deserialize_with = "de_string_to_f64")]
    open: f64,
    #[serde(deserialize_with = "de_string_to_f64")]
    high: f64,
    #[serde(deserialize_with = "de_string_to_f64")]
    low: f64,
    #[serde(deserialize_with = "de_string_to_f64")]
    close: f64,
    confirm: bool,
}

/// Stream message envelope. Subscription acks carry `success` and no topic.
#[derive(Debug, Deserialize)]
struct StreamMessage {
    topic: Option<String>,
    success: Option<bool>,
    #[serde(alias = "retMsg")]
    ret_msg: Option<String>,
    data: Option<serde_json::Value>,
}

/// Websocket client for Bybit's public spot stream.
///
/// Subscribes to one kline topic and forwards every still-forming candle
/// into the session's event channel. Closed candles and foreign topics are
/// ignored. The connection is never reopened: a transport error or a server
/// close ends the read loop with a log line.
pub struct BybitWebsocketClient {
    symbol: String,
    interval: Interval,
    session: Arc<ChartSession>,
    events: mpsc::UnboundedSender<MarketEvent>,
}

impl BybitWebsocketClient {
    /// Create a new websocket client
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        session: Arc<ChartSession>,
        events: mpsc::UnboundedSender<MarketEvent>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            session,
            events,
        }
    }

    /// Connect, subscribe, and run the read loop until the stream ends.
    pub async fn run(&self) -> Result<(), GatewayError> {
        info!("connecting to {}", SPOT_WS_HOST);

        let (ws_stream, _) = connect_async(SPOT_WS_HOST).await?;
        info!("websocket connected");

        let (mut write, mut read) = ws_stream.split();

        let topic = kline_topic(self.interval, &self.symbol);
        let subscribe = json!({
            "op": "subscribe",
            "args": [topic]
        });
        write.send(Message::Text(subscribe.to_string().into())).await?;

        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => self.handle_message(&text),
                Ok(Message::Ping(payload)) => {
                    debug!("received ping");
                    let _ = write.send(Message::Pong(payload)).await;
                }
                Ok(Message::Pong(_)) => {
                    debug!("received pong");
                }
                Ok(Message::Close(_)) => {
                    warn!("websocket closed by server");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!("websocket read error: {}", e);
                    break;
                }
            }
        }

        warn!("websocket read loop ended");
        Ok(())
    }

    /// Parse one text frame and forward the candles it carries, if any.
    fn handle_message(&self, text: &str) {
        let message: StreamMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                error!("failed to parse stream message: {}", e);
                return;
            }
        };

        if let Some(success) = message.success {
            debug!(
                "subscription ack: success={} {}",
                success,
                message.ret_msg.unwrap_or_default()
            );
            return;
        }

        let Some(topic) = message.topic else {
            return;
        };
        if !topic.starts_with("kline.") {
            return;
        }

        let Some(data) = message.data else {
            return;
        };
        let klines: Vec<StreamKline> = match serde_json::from_value(data) {
            Ok(klines) => klines,
            Err(e) => {
                error!("failed to parse kline payload: {}", e);
                return;
            }
        };

        for kline in &klines {
            if let Some(candle) = self.live_candle(kline) {
                if self.events.send(MarketEvent::Live(candle)).is_err() {
                    warn!("event channel closed, dropping live candle");
                }
            }
        }
    }

    /// Map a stream kline into a live candle update.
    ///
    /// Confirmed candles are skipped: the closed interval was already covered
    /// by its in-progress updates, forwarding it again would duplicate the
    /// finalized point. The first live candle's open time seeds the backfill
    /// cutoff.
    fn live_candle(&self, kline: &StreamKline) -> Option<Candle> {
        if kline.confirm {
            return None;
        }

        self.session.record_live_open(kline.start);

        let candle = Candle::new(
            kline.start / 1000,
            kline.open,
            kline.high,
            kline.low,
            kline.close,
        );

        candle.is_finite().then_some(candle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> (
        BybitWebsocketClient,
        mpsc::UnboundedReceiver<MarketEvent>,
        Arc<ChartSession>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Arc::new(ChartSession::new());
        let client = BybitWebsocketClient::new("BTCUSDT", Interval::Minute, session.clone(), tx);
        (client, rx, session)
    }

    fn kline_frame(start_ms: i64, open: &str, confirm: bool) -> String {
        format!(
            r#"{{"topic":"kline.1.BTCUSDT","type":"snapshot","ts":1731232861234,"data":[{{"start":{start_ms},"end":{},"interval":"1","open":"{open}","close":"100.7","high":"101.0","low":"99.9","volume":"3.4","turnover":"341.2","confirm":{confirm},"timestamp":1731232861234}}]}}"#,
            start_ms + 59_999,
        )
    }

    #[test]
    fn test_unconfirmed_candle_forwarded() {
        let (client, mut rx, session) = client();

        client.handle_message(&kline_frame(1_731_232_860_000, "100.5", false));

        match rx.try_recv() {
            Ok(MarketEvent::Live(candle)) => {
                assert_eq!(candle.time, 1_731_232_860);
                assert_eq!(candle.open, 100.5);
                assert_eq!(candle.high, 101.0);
                assert_eq!(candle.low, 99.9);
                assert_eq!(candle.close, 100.7);
            }
            other => panic!("expected live candle, got {:?}", other),
        }

        assert_eq!(session.cutoff_ms(), 1_731_232_860_000);
    }

    #[test]
    fn test_confirmed_candle_ignored() {
        let (client, mut rx, session) = client();

        client.handle_message(&kline_frame(1_731_232_860_000, "100.5", true));

        assert!(rx.try_recv().is_err());
        // A confirmed candle must not seed the cutoff either.
        assert_ne!(session.cutoff_ms(), 1_731_232_860_000);
    }

    #[test]
    fn test_cutoff_is_first_unconfirmed_start() {
        let (client, mut rx, session) = client();

        client.handle_message(&kline_frame(1_731_232_860_000, "100.5", false));
        client.handle_message(&kline_frame(1_731_232_920_000, "100.7", false));

        assert_eq!(session.cutoff_ms(), 1_731_232_860_000);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_non_finite_candle_dropped_after_cutoff_recorded() {
        let (client, mut rx, session) = client();

        client.handle_message(&kline_frame(1_731_232_860_000, "NaN", false));

        assert!(rx.try_recv().is_err());
        assert_eq!(session.cutoff_ms(), 1_731_232_860_000);
    }

    #[test]
    fn test_invalid_json_discarded() {
        let (client, mut rx, _session) = client();

        client.handle_message("not json at all");

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_subscription_ack_ignored() {
        let (client, mut rx, _session) = client();

        client.handle_message(
            r#"{"success":true,"ret_msg":"","conn_id":"7a3...","req_id":"","op":"subscribe"}"#,
        );

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_foreign_topic_ignored() {
        let (client, mut rx, _session) = client();

        client.handle_message(
            r#"{"topic":"publicTrade.BTCUSDT","type":"snapshot","data":[{"T":1731232861234,"s":"BTCUSDT","p":"100.5","v":"0.1","S":"Buy"}]}"#,
        );

        assert!(rx.try_recv().is_err());
    }
}
