use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::price::{PricePoint, TimeSeries};
use crate::models::settings::AnalysisSettings;
use crate::models::timeframe::Timeframe;
use super::http::{build_client, endpoint, get_json, require_symbol};
use super::traits::{ProviderTag, SeriesProvider};

const PROVIDER: &str = "Yahoo Finance";
const BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance chart provider for stocks, indices and crypto pairs.
///
/// - **Free**: No API key required (unofficial public endpoint).
/// - **Symbols**: `AAPL`, `TSLA`, `BTC-USD`, `^GSPC`, ...
/// - **Data**: daily closes from `/v8/finance/chart/{symbol}`.
///
/// Browsers need a pass-through proxy for this endpoint; when one is
/// configured the chart URL is sent to it as the `url` query parameter.
pub struct YahooFinanceProvider {
    client: Client,
    base_url: String,
    proxy: Option<String>,
}

impl YahooFinanceProvider {
    pub fn new(proxy: Option<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            base_url: BASE_URL.to_string(),
            proxy,
        }
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self::new(settings.yahoo_proxy.clone(), settings.request_timeout_secs)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Direct chart URL for a symbol and range. The symbol is one encoded
    /// path segment.
    pub fn chart_url(&self, symbol: &str, timeframe: Timeframe) -> Result<Url, CoreError> {
        let symbol = symbol.to_uppercase();
        let mut url = endpoint(&self.base_url, &["v8", "finance", "chart", &symbol])?;
        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("range", timeframe.yahoo_range());
        Ok(url)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SeriesProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn tag(&self) -> ProviderTag {
        ProviderTag::YahooFinance
    }

    async fn fetch_series(&self, symbol: &str, timeframe: Timeframe) -> Result<Value, CoreError> {
        let symbol = require_symbol(symbol)?.to_uppercase();
        let chart_url = self.chart_url(&symbol, timeframe)?;

        info!(provider = PROVIDER, symbol = %symbol, range = timeframe.yahoo_range(), "fetching chart");
        let request = match &self.proxy {
            Some(proxy) => self.client.get(proxy).query(&[("url", chart_url.as_str())]),
            None => self.client.get(chart_url),
        };
        get_json(request, PROVIDER, &symbol).await
    }
}

// ── Column adapter ──────────────────────────────────────────────────

/// Normalize a `v8/finance/chart` payload:
///
/// ```json
/// { "chart": { "result": [ {
///     "timestamp": [secs, ...],
///     "indicators": { "quote": [ { "close": [price | null, ...] } ] }
/// } ] } }
/// ```
///
/// Timestamps are converted from seconds to milliseconds. Indices whose close
/// is `null` are dropped. Volume and market cap are not reported and stay 0.
pub fn normalize_chart(raw: &Value) -> Result<TimeSeries, CoreError> {
    let result = raw
        .get("chart")
        .and_then(|c| c.get("result"))
        .and_then(|r| r.get(0))
        .filter(|r| !r.is_null())
        .ok_or_else(|| CoreError::malformed(PROVIDER, chart_error_message(raw)))?;

    let timestamps = result
        .get("timestamp")
        .and_then(Value::as_array)
        .ok_or_else(|| CoreError::malformed(PROVIDER, "missing `chart.result[0].timestamp` array"))?;

    let closes = result
        .get("indicators")
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.get(0))
        .and_then(|q| q.get("close"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            CoreError::malformed(PROVIDER, "missing `chart.result[0].indicators.quote[0].close` array")
        })?;

    if timestamps.len() != closes.len() {
        return Err(CoreError::malformed(
            PROVIDER,
            format!(
                "timestamp and close columns differ in length ({} vs {})",
                timestamps.len(),
                closes.len()
            ),
        ));
    }

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, (ts, close)) in timestamps.iter().zip(closes).enumerate() {
        let seconds = ts.as_i64().ok_or_else(|| {
            CoreError::malformed(PROVIDER, format!("timestamp[{i}] is not an integer"))
        })?;
        let timestamp_ms = seconds.checked_mul(1000).ok_or_else(|| {
            CoreError::malformed(PROVIDER, format!("timestamp[{i}] is out of range"))
        })?;

        let price = match close {
            Value::Null => continue,
            value => value.as_f64().ok_or_else(|| {
                CoreError::malformed(PROVIDER, format!("close[{i}] is not a number"))
            })?,
        };

        points.push(PricePoint::new(timestamp_ms, price));
    }

    let dropped = timestamps.len() - points.len();
    if dropped > 0 {
        debug!(provider = PROVIDER, dropped, kept = points.len(), "dropped points without a close");
    }

    Ok(TimeSeries::from_points(points))
}

/// Yahoo reports unknown symbols as `chart.error` with a null `result`.
fn chart_error_message(raw: &Value) -> String {
    raw.get("chart")
        .and_then(|c| c.get("error"))
        .and_then(|e| e.get("description"))
        .and_then(Value::as_str)
        .map(|d| format!("no chart result: {d}"))
        .unwrap_or_else(|| "missing `chart.result[0]`".to_string())
}
