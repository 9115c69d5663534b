use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::price::{PricePoint, TimeSeries};
use crate::models::settings::AnalysisSettings;
use crate::models::snapshot::AssetSnapshot;
use crate::models::timeframe::Timeframe;
use super::http::{build_client, endpoint, get_json, require_symbol};
use super::traits::{ProviderTag, SeriesProvider, SnapshotSource};

const PROVIDER: &str = "CoinGecko";
const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// CoinGecko API provider for cryptocurrency series and the market listing.
///
/// - **Free**: works without a key; a demo key (settings key "coingecko")
///   raises the rate limit and is sent as the `x-cg-demo-api-key` header.
/// - **Series**: `/coins/{id}/market_chart?vs_currency=..&days=..`
/// - **Listing**: `/coins/markets` ordered by market cap, with 1h/24h/7d/30d changes.
///
/// Note: CoinGecko identifies coins by lowercase ids like "bitcoin", "ethereum".
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    vs_currency: String,
}

impl CoinGeckoProvider {
    pub fn new(api_key: Option<String>, vs_currency: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            base_url: BASE_URL.to_string(),
            api_key,
            vs_currency: vs_currency.into().to_lowercase(),
        }
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self::new(
            settings.api_key("coingecko").map(str::to_string),
            settings.vs_currency.clone(),
            settings.request_timeout_secs,
        )
    }

    /// Point the provider at another host (mirrors, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Market chart endpoint for a coin id, without the query string.
    pub fn market_chart_url(&self, id: &str) -> Result<Url, CoreError> {
        endpoint(&self.base_url, &["coins", id, "market_chart"])
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SeriesProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn tag(&self) -> ProviderTag {
        ProviderTag::CoinGecko
    }

    async fn fetch_series(&self, symbol: &str, timeframe: Timeframe) -> Result<Value, CoreError> {
        let id = require_symbol(symbol)?.to_lowercase();
        let url = self.market_chart_url(&id)?;
        let days = timeframe.days().to_string();

        info!(provider = PROVIDER, coin = %id, days = %days, "fetching market chart");
        let request = self
            .get(url)
            .query(&[("vs_currency", self.vs_currency.as_str()), ("days", days.as_str())]);
        get_json(request, PROVIDER, &id).await
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SnapshotSource for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_snapshots(&self, limit: usize) -> Result<Vec<AssetSnapshot>, CoreError> {
        let url = endpoint(&self.base_url, &["coins", "markets"])?;
        let per_page = limit.to_string();

        info!(provider = PROVIDER, limit, "fetching market listing");
        let request = self.get(url).query(&[
            ("vs_currency", "usd"),
            ("order", "market_cap_desc"),
            ("per_page", per_page.as_str()),
            ("page", "1"),
            ("sparkline", "false"),
            ("price_change_percentage", "1h,24h,7d,30d"),
        ]);
        let body = get_json(request, PROVIDER, "market listing").await?;
        decode_market_listing(body)
    }
}

/// Decode a `/coins/markets` body record by record.
///
/// The body must be an array. A record that does not decode is skipped with
/// a warning so one bad asset never costs the rest of the listing.
pub fn decode_market_listing(body: Value) -> Result<Vec<AssetSnapshot>, CoreError> {
    let Value::Array(records) = body else {
        return Err(CoreError::malformed(PROVIDER, "market listing is not an array"));
    };

    let snapshots = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let id = record.get("id").and_then(Value::as_str).map(str::to_string);
            serde_json::from_value::<AssetSnapshot>(record)
                .inspect_err(|e| warn!(provider = PROVIDER, index = i, id = ?id, error = %e, "skipping listing record"))
                .ok()
        })
        .collect();
    Ok(snapshots)
}

// ── Parallel-tuple adapter ──────────────────────────────────────────

/// Normalize a `market_chart` payload:
///
/// ```json
/// { "prices": [[ms, price], ...],
///   "total_volumes": [[ms, volume], ...],
///   "market_caps": [[ms, cap], ...] }
/// ```
///
/// Points are aligned by index, not by timestamp. Volume and market cap
/// entries that are missing at an index read as 0. Indices whose price is
/// missing or `null` are dropped.
pub fn normalize_market_chart(raw: &Value) -> Result<TimeSeries, CoreError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| CoreError::malformed(PROVIDER, "payload is not a JSON object"))?;

    let prices = tuple_column(obj, "prices")?
        .ok_or_else(|| CoreError::malformed(PROVIDER, "missing `prices` array"))?;
    let volumes = tuple_column(obj, "total_volumes")?;
    let market_caps = tuple_column(obj, "market_caps")?;

    if let Some(v) = volumes.filter(|v| v.len() != prices.len()) {
        debug!(provider = PROVIDER, prices = prices.len(), volumes = v.len(), "volume column length differs");
    }

    let mut points = Vec::with_capacity(prices.len());
    for (i, entry) in prices.iter().enumerate() {
        let pair = entry.as_array().ok_or_else(|| {
            CoreError::malformed(PROVIDER, format!("prices[{i}] is not a [timestamp, price] pair"))
        })?;

        let timestamp_ms = pair.first().and_then(json_integer).ok_or_else(|| {
            CoreError::malformed(PROVIDER, format!("prices[{i}] timestamp is missing or not a number"))
        })?;

        // A missing price drops the index just like an explicit null.
        let price = match pair.get(1) {
            None | Some(Value::Null) => continue,
            Some(value) => value.as_f64().ok_or_else(|| {
                CoreError::malformed(PROVIDER, format!("prices[{i}] price is not a number"))
            })?,
        };

        points.push(
            PricePoint::new(timestamp_ms, price)
                .with_volume(tuple_value_at(volumes, i))
                .with_market_cap(tuple_value_at(market_caps, i)),
        );
    }

    let dropped = prices.len() - points.len();
    if dropped > 0 {
        debug!(provider = PROVIDER, dropped, kept = points.len(), "dropped points without a price");
    }

    Ok(TimeSeries::from_points(points))
}

/// An optional field that, when present, must be an array.
fn tuple_column<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a Vec<Value>>, CoreError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(CoreError::malformed(PROVIDER, format!("`{field}` is not an array"))),
    }
}

fn tuple_value_at(column: Option<&Vec<Value>>, index: usize) -> f64 {
    column
        .and_then(|c| c.get(index))
        .and_then(|entry| entry.get(1))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn json_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fractional_timestamps_are_rounded() {
        let series = normalize_market_chart(&json!({ "prices": [[1000.6, 5.0]] })).unwrap();
        assert_eq!(series.points()[0].timestamp_ms, 1001);
    }

    #[test]
    fn short_volume_column_reads_as_zero() {
        let series = normalize_market_chart(&json!({
            "prices": [[1, 1.0], [2, 2.0]],
            "total_volumes": [[1, 10.0]]
        }))
        .unwrap();
        assert_eq!(series.points()[0].volume, 10.0);
        assert_eq!(series.points()[1].volume, 0.0);
    }

    #[test]
    fn coin_id_is_a_single_encoded_segment() {
        let provider = CoinGeckoProvider::new(None, "usd", 5);
        assert_eq!(
            provider.market_chart_url("bitcoin").unwrap().as_str(),
            "https://api.coingecko.com/api/v3/coins/bitcoin/market_chart"
        );
        let url = provider.market_chart_url("a/b?x=1").unwrap();
        assert_eq!(url.path(), "/api/v3/coins/a%2Fb%3Fx=1/market_chart");
        assert_eq!(url.query(), None);
    }
}
