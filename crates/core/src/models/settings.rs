use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::CoreError;
use super::timeframe::Timeframe;

/// Parameters of the short- vs long-term average comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendSettings {
    /// Number of most recent points in the short-term average
    pub short_window: usize,
    /// Difference (%) above which a trend is Bullish
    pub bullish_threshold: f64,
    /// Difference (%) below which a trend is Bearish
    pub bearish_threshold: f64,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            short_window: 7,
            bullish_threshold: 2.0,
            bearish_threshold: -2.0,
        }
    }
}

/// Parameters of the multi-asset alert rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    /// Maximum number of insights returned; 0 turns insights off
    pub cap: usize,
    /// |24h change| (%) above which an asset is flagged volatile
    pub volatility_threshold: f64,
    /// 7d change (%) below which an up-day counts as a reversal
    pub reversal_threshold: f64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            cap: 3,
            volatility_threshold: 5.0,
            reversal_threshold: -5.0,
        }
    }
}

/// Explicit configuration passed into the library at call time.
///
/// Nothing here is read from the environment by the library itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub trend: TrendSettings,
    pub insights: InsightSettings,

    /// Lookback used when a request does not name one.
    pub default_timeframe: Timeframe,

    /// Quote currency for CoinGecko series (e.g., "usd", "inr").
    pub vs_currency: String,

    /// Number of assets requested from the market listing.
    pub snapshot_limit: usize,

    /// Optional API keys, by provider (e.g., "coingecko").
    pub api_keys: HashMap<String, String>,

    /// Optional pass-through proxy for Yahoo requests. The chart URL is sent
    /// to it as the `url` query parameter.
    pub yahoo_proxy: Option<String>,

    /// HTTP timeout for provider clients.
    pub request_timeout_secs: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            trend: TrendSettings::default(),
            insights: InsightSettings::default(),
            default_timeframe: Timeframe::default(),
            vs_currency: "usd".to_string(),
            snapshot_limit: 12,
            api_keys: HashMap::new(),
            yahoo_proxy: None,
            request_timeout_secs: 30,
        }
    }
}

impl AnalysisSettings {
    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let settings: AnalysisSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file on disk.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }

    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.api_keys.get(provider).map(String::as_str)
    }

    /// Reject settings the analysis cannot work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        let t = &self.trend;
        if t.short_window == 0 {
            return Err(CoreError::InvalidSettings(
                "trend.short_window must be at least 1".into(),
            ));
        }
        if !t.bullish_threshold.is_finite() || !t.bearish_threshold.is_finite() {
            return Err(CoreError::InvalidSettings(
                "trend thresholds must be finite".into(),
            ));
        }
        if t.bullish_threshold < t.bearish_threshold {
            return Err(CoreError::InvalidSettings(format!(
                "trend.bullish_threshold ({}) is below trend.bearish_threshold ({})",
                t.bullish_threshold, t.bearish_threshold
            )));
        }

        let i = &self.insights;
        if !i.volatility_threshold.is_finite() || !i.reversal_threshold.is_finite() {
            return Err(CoreError::InvalidSettings(
                "insight thresholds must be finite".into(),
            ));
        }

        if self.vs_currency.trim().is_empty() {
            return Err(CoreError::InvalidSettings("vs_currency is empty".into()));
        }
        if self.snapshot_limit == 0 {
            return Err(CoreError::InvalidSettings(
                "snapshot_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
