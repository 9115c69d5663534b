use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::snapshot::AssetSnapshot;
use crate::models::timeframe::Timeframe;

/// Identifies which provider a raw payload came from, and so which adapter
/// turns it into a `TimeSeries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderTag {
    /// CoinGecko `market_chart`: parallel `[ms, value]` tuple arrays
    CoinGecko,
    /// Yahoo Finance `v8/finance/chart`: epoch-second column arrays
    YahooFinance,
}

/// Structural family of a provider's series payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Separate `[timestamp_ms, value]` arrays for price, volume and market cap
    ParallelTuple,
    /// One timestamp column (seconds) and one close-price column
    Column,
}

impl ProviderTag {
    pub fn shape(self) -> PayloadShape {
        match self {
            ProviderTag::CoinGecko => PayloadShape::ParallelTuple,
            ProviderTag::YahooFinance => PayloadShape::Column,
        }
    }
}

impl std::fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderTag::CoinGecko => write!(f, "CoinGecko"),
            ProviderTag::YahooFinance => write!(f, "Yahoo Finance"),
        }
    }
}

impl std::str::FromStr for ProviderTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coingecko" | "cg" => Ok(ProviderTag::CoinGecko),
            "yahoo" | "yahoofinance" | "yahoo_finance" => Ok(ProviderTag::YahooFinance),
            other => Err(CoreError::NoProvider(other.to_string())),
        }
    }
}

/// Fetch boundary for price series.
///
/// Implementations only transport: they return the provider's payload as-is
/// and leave shape validation to `SeriesNormalizer`. Swapping an API means
/// replacing one implementation and its adapter, nothing else.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SeriesProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Tag used to pick the normalization adapter for this provider's payloads.
    fn tag(&self) -> ProviderTag;

    /// Fetch the raw series payload for `symbol` over `timeframe`.
    async fn fetch_series(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<serde_json::Value, CoreError>;
}

/// Fetch boundary for the multi-asset market listing.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SnapshotSource: Send + Sync {
    fn name(&self) -> &str;

    /// Current state of the top `limit` assets, in listing order.
    async fn fetch_snapshots(&self, limit: usize) -> Result<Vec<AssetSnapshot>, CoreError>;
}
