use serde::{Deserialize, Serialize};

/// One asset's current market state, as supplied by a market listing.
///
/// Field names follow the CoinGecko `/coins/markets` record so a listing
/// response deserializes straight into `Vec<AssetSnapshot>`. Every numeric
/// field is optional; `null` and absent both read as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    /// Provider asset id (e.g., "bitcoin")
    #[serde(rename = "id")]
    pub asset_id: String,

    /// Display name (e.g., "Bitcoin"); empty when the listing omits it
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub symbol: Option<String>,

    #[serde(default)]
    pub current_price: Option<f64>,

    #[serde(default)]
    pub market_cap: Option<f64>,

    #[serde(default)]
    pub total_volume: Option<f64>,

    #[serde(default)]
    pub market_cap_rank: Option<u32>,

    #[serde(default, rename = "price_change_percentage_1h_in_currency")]
    pub change_1h_percent: Option<f64>,

    #[serde(default, rename = "price_change_percentage_24h")]
    pub change_24h_percent: Option<f64>,

    #[serde(default, rename = "price_change_percentage_7d_in_currency")]
    pub change_7d_percent: Option<f64>,

    #[serde(default, rename = "price_change_percentage_30d_in_currency")]
    pub change_30d_percent: Option<f64>,
}

impl AssetSnapshot {
    /// Minimal snapshot with no market figures.
    pub fn new(asset_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            name: name.into(),
            symbol: None,
            current_price: None,
            market_cap: None,
            total_volume: None,
            market_cap_rank: None,
            change_1h_percent: None,
            change_24h_percent: None,
            change_7d_percent: None,
            change_30d_percent: None,
        }
    }

    pub fn with_changes(mut self, change_24h: f64, change_7d: f64) -> Self {
        self.change_24h_percent = Some(change_24h);
        self.change_7d_percent = Some(change_7d);
        self
    }

    // Missing change figures count as zero.

    pub fn change_24h(&self) -> f64 {
        self.change_24h_percent.unwrap_or(0.0)
    }

    pub fn change_7d(&self) -> f64 {
        self.change_7d_percent.unwrap_or(0.0)
    }

    pub fn change_30d(&self) -> f64 {
        self.change_30d_percent.unwrap_or(0.0)
    }
}
