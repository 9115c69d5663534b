use serde_json::Value;

use crate::errors::CoreError;
use crate::models::price::TimeSeries;
use crate::providers::traits::ProviderTag;
use crate::providers::{coingecko, yahoo_finance};

/// Converts provider-specific raw payloads into the canonical `TimeSeries`.
///
/// One adapter per provider tag lives next to that provider; this type only
/// dispatches. Supporting a new provider means adding a tag and its adapter.
///
/// Only a misshaped payload is an error. A payload whose every price is
/// missing normalizes to an empty series.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesNormalizer;

impl SeriesNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, provider: ProviderTag, raw: &Value) -> Result<TimeSeries, CoreError> {
        match provider {
            ProviderTag::CoinGecko => coingecko::normalize_market_chart(raw),
            ProviderTag::YahooFinance => yahoo_finance::normalize_chart(raw),
        }
    }
}
