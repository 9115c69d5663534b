use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::settings::AnalysisSettings;

use super::coingecko::CoinGeckoProvider;
use super::traits::{ProviderTag, SeriesProvider, SnapshotSource};
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of the available series providers and the market listing source.
///
/// Routes fetches by `ProviderTag`. Registering a provider under a tag that is
/// already taken replaces the previous one.
pub struct ProviderRegistry {
    series: HashMap<ProviderTag, Arc<dyn SeriesProvider>>,
    snapshots: Option<Arc<dyn SnapshotSource>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            snapshots: None,
        }
    }

    /// Create a registry with CoinGecko (series + listing) and Yahoo Finance.
    pub fn new_with_defaults(settings: &AnalysisSettings) -> Self {
        let mut registry = Self::new();

        let coingecko = Arc::new(CoinGeckoProvider::from_settings(settings));
        registry.register(coingecko.clone());
        registry.set_snapshot_source(coingecko);

        registry.register(Arc::new(YahooFinanceProvider::from_settings(settings)));

        registry
    }

    /// Register a series provider under its own tag.
    pub fn register(&mut self, provider: Arc<dyn SeriesProvider>) {
        self.series.insert(provider.tag(), provider);
    }

    pub fn set_snapshot_source(&mut self, source: Arc<dyn SnapshotSource>) {
        self.snapshots = Some(source);
    }

    pub fn get(&self, tag: ProviderTag) -> Result<&dyn SeriesProvider, CoreError> {
        self.series
            .get(&tag)
            .map(|p| p.as_ref())
            .ok_or_else(|| CoreError::NoProvider(tag.to_string()))
    }

    pub fn snapshot_source(&self) -> Result<&dyn SnapshotSource, CoreError> {
        self.snapshots
            .as_deref()
            .ok_or_else(|| CoreError::NoProvider("market listing".to_string()))
    }

    pub fn has_provider(&self, tag: ProviderTag) -> bool {
        self.series.contains_key(&tag)
    }

    /// Names of the registered series providers, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.series.values().map(|p| p.name().to_string()).collect();
        names.sort();
        names
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
