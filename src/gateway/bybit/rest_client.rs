//! Bybit REST API client.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::constants::{
    CATEGORY, HISTORY_LIMIT, HISTORY_START_MS, INTERVAL_TO_BYBIT, KLINE_PATH, REST_HOST,
};
use crate::gateway::GatewayError;
use crate::market::{Candle, Interval};

/// Kline endpoint response envelope.
#[derive(Debug, Deserialize)]
struct KlineResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    result: Option<KlineResult>,
}

#[derive(Debug, Deserialize)]
struct KlineResult {
    #[serde(default)]
    list: Option<Vec<Vec<Value>>>,
}

/// REST API client for Bybit public market data.
pub struct BybitRestClient {
    client: Client,
    host: String,
}

impl BybitRestClient {
    /// Create a new REST client
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            host: REST_HOST.to_string(),
        }
    }

    /// Fetch up to [`HISTORY_LIMIT`] candles of one symbol ending at `end_ms`.
    ///
    /// One request, no pagination and no retry. The returned candles keep the
    /// provider's order (newest first); the chart series orders them on bulk
    /// load.
    pub async fn query_kline_history(
        &self,
        symbol: &str,
        interval: Interval,
        end_ms: i64,
    ) -> Result<Vec<Candle>, GatewayError> {
        let interval_code = INTERVAL_TO_BYBIT.get(&interval).copied().unwrap_or("1");
        let url = format!(
            "{}{}?category={}&symbol={}&interval={}&start={}&end={}&limit={}",
            self.host,
            KLINE_PATH,
            CATEGORY,
            symbol,
            interval_code,
            HISTORY_START_MS,
            end_ms,
            HISTORY_LIMIT,
        );

        debug!("Bybit API request: GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Api {
                ret_code: i64::from(status.as_u16()),
                ret_msg: text,
            });
        }

        let decoded: KlineResponse = serde_json::from_str(&text)?;
        parse_kline_response(decoded)
    }
}

impl Default for BybitRestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a decoded kline response into candles.
///
/// A non-zero `retCode` and a missing result list are application errors that
/// fail the whole batch; rows with unparseable or non-finite price fields are
/// dropped individually.
fn parse_kline_response(response: KlineResponse) -> Result<Vec<Candle>, GatewayError> {
    if response.ret_code != 0 {
        return Err(GatewayError::Api {
            ret_code: response.ret_code,
            ret_msg: response.ret_msg,
        });
    }

    let list = response
        .result
        .and_then(|r| r.list)
        .ok_or_else(|| GatewayError::Parse("kline result list missing".to_string()))?;

    let mut candles = Vec::with_capacity(list.len());
    for row in &list {
        if let Some(candle) = parse_kline_row(row) {
            candles.push(candle);
        } else {
            debug!("dropping malformed kline row: {:?}", row);
        }
    }

    Ok(candles)
}

/// Map one `[startMs, open, high, low, close, ...]` row into a candle.
fn parse_kline_row(row: &[Value]) -> Option<Candle> {
    if row.len() < 5 {
        return None;
    }

    let start_ms = field_i64(&row[0])?;
    let candle = Candle::new(
        start_ms / 1000,
        field_f64(&row[1]),
        field_f64(&row[2]),
        field_f64(&row[3]),
        field_f64(&row[4]),
    );

    candle.is_finite().then_some(candle)
}

/// Kline rows carry numeric strings; plain numbers are accepted as well.
fn field_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn field_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> KlineResponse {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_history_time_is_start_ms_over_1000() {
        let response = decode(
            r#"{"retCode":0,"retMsg":"OK","result":{"category":"spot","symbol":"BTCUSDT","list":[
                ["1731232920000","100.5","106.2","99.1","105.4","12.3","1234.5"],
                ["1731232860000","99.8","101.0","99.0","100.5","8.7","871.0"]
            ]}}"#,
        );

        let candles = parse_kline_response(response).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 1_731_232_920);
        assert_eq!(candles[1].time, 1_731_232_860);
        assert_eq!(candles[0].open, 100.5);
        assert_eq!(candles[0].high, 106.2);
        assert_eq!(candles[0].low, 99.1);
        assert_eq!(candles[0].close, 105.4);
    }

    #[test]
    fn test_numeric_fields_accepted() {
        let response = decode(
            r#"{"retCode":0,"retMsg":"OK","result":{"list":[
                [1731232860000, 100.0, 106.0, 99.0, 105.0]
            ]}}"#,
        );

        let candles = parse_kline_response(response).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].time, 1_731_232_860);
        assert_eq!(candles[0].close, 105.0);
    }

    #[test]
    fn test_non_zero_ret_code_is_api_error() {
        let response = decode(
            r#"{"retCode":10001,"retMsg":"params error: Symbol Invalid","result":{}}"#,
        );

        match parse_kline_response(response) {
            Err(GatewayError::Api { ret_code, ret_msg }) => {
                assert_eq!(ret_code, 10001);
                assert!(ret_msg.contains("Symbol Invalid"));
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_result_list_is_parse_error() {
        let response = decode(r#"{"retCode":0,"retMsg":"OK"}"#);
        assert!(matches!(
            parse_kline_response(response),
            Err(GatewayError::Parse(_))
        ));
    }

    #[test]
    fn test_non_finite_row_dropped_without_aborting_batch() {
        let response = decode(
            r#"{"retCode":0,"retMsg":"OK","result":{"list":[
                ["1731232920000","100.5","106.2","99.1","105.4"],
                ["1731232860000","NaN","101.0","99.0","100.5"],
                ["1731232800000","99.0","garbage","98.0","98.5"]
            ]}}"#,
        );

        let candles = parse_kline_response(response).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].time, 1_731_232_920);
    }

    #[test]
    fn test_short_row_dropped() {
        let response = decode(
            r#"{"retCode":0,"retMsg":"OK","result":{"list":[
                ["1731232860000","100.5","106.2"]
            ]}}"#,
        );

        let candles = parse_kline_response(response).unwrap();
        assert!(candles.is_empty());
    }
}
