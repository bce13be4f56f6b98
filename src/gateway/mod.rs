//! Exchange gateway implementations.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub mod bybit;

/// Errors surfaced by gateway operations.
///
/// Every variant is terminal for the one operation that produced it; callers
/// log and move on. Nothing here crashes the process or closes the stream.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request could not be sent or the response body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Websocket connect or frame-level failure.
    #[error("websocket error: {0}")]
    Websocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Non-success HTTP status or application-level error code.
    #[error("api error {ret_code}: {ret_msg}")]
    Api { ret_code: i64, ret_msg: String },

    /// Payload did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Parse(err.to_string())
    }
}

/// Deserialize a numeric string field into f64.
pub fn de_string_to_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    s.parse::<f64>().map_err(serde::de::Error::custom)
}
