pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use models::{
    insight::Insight,
    price::TimeSeries,
    settings::AnalysisSettings,
    snapshot::AssetSnapshot,
    timeframe::Timeframe,
    trend::TrendReport,
};
use providers::{registry::ProviderRegistry, traits::ProviderTag};
use services::{
    insight_generator::InsightGenerator,
    request_coordinator::{AnalysisRequest, Delivery, RequestCoordinator, SeriesAnalysis},
    series_normalizer::SeriesNormalizer,
    trend_analyzer::TrendAnalyzer,
};

use errors::CoreError;

/// Main entry point for the Market Insight core library.
/// Holds the settings and the services needed to fetch and analyze market data.
#[must_use]
pub struct MarketInsight {
    settings: AnalysisSettings,
    normalizer: SeriesNormalizer,
    analyzer: TrendAnalyzer,
    insight_generator: InsightGenerator,
    coordinator: RequestCoordinator,
}

impl std::fmt::Debug for MarketInsight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketInsight")
            .field("trend", &self.settings.trend)
            .field("insights", &self.settings.insights)
            .field("providers", &self.coordinator.registry().provider_names())
            .finish()
    }
}

impl MarketInsight {
    /// Build with the default providers (CoinGecko, Yahoo Finance).
    pub fn new(settings: AnalysisSettings) -> Result<Self, CoreError> {
        let registry = ProviderRegistry::new_with_defaults(&settings);
        Self::with_registry(settings, registry)
    }

    /// Build with a caller-supplied registry (custom or mock providers).
    pub fn with_registry(
        settings: AnalysisSettings,
        registry: ProviderRegistry,
    ) -> Result<Self, CoreError> {
        settings.validate()?;

        let analyzer = TrendAnalyzer::new(settings.trend.clone());
        let insight_generator = InsightGenerator::new(settings.insights.clone());
        let coordinator = RequestCoordinator::new(
            registry,
            analyzer.clone(),
            insight_generator.clone(),
            settings.snapshot_limit,
        );

        Ok(Self {
            settings,
            normalizer: SeriesNormalizer::new(),
            analyzer,
            insight_generator,
            coordinator,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    // ── Pure computations ───────────────────────────────────────────

    /// Normalize an already-received raw payload.
    pub fn normalize(
        &self,
        provider: ProviderTag,
        raw: &serde_json::Value,
    ) -> Result<TimeSeries, CoreError> {
        self.normalizer.normalize(provider, raw)
    }

    /// Trend report for a series; `None` when the series is empty.
    #[must_use]
    pub fn analyze_series(&self, series: &TimeSeries) -> Option<TrendReport> {
        self.analyzer.analyze(series)
    }

    #[must_use]
    pub fn generate_insights(&self, snapshots: &[AssetSnapshot]) -> Vec<Insight> {
        self.insight_generator.generate(snapshots)
    }

    // ── Request pipelines ───────────────────────────────────────────

    /// A request using the configured default timeframe.
    pub fn request(&self, provider: ProviderTag, symbol: impl Into<String>) -> AnalysisRequest {
        AnalysisRequest::new(provider, symbol, self.settings.default_timeframe)
    }

    /// Fetch, normalize and analyze one series into `slot`.
    pub async fn analyze(
        &self,
        slot: &str,
        request: AnalysisRequest,
    ) -> Result<Delivery<SeriesAnalysis>, CoreError> {
        self.coordinator.analyze(slot, request).await
    }

    /// Shorthand for `analyze` with a day count (1, 7, 30, 90 or 365).
    pub async fn analyze_days(
        &self,
        slot: &str,
        provider: ProviderTag,
        symbol: &str,
        days: u32,
    ) -> Result<Delivery<SeriesAnalysis>, CoreError> {
        let timeframe = Timeframe::try_from(days)?;
        self.analyze(slot, AnalysisRequest::new(provider, symbol, timeframe))
            .await
    }

    /// Analyze several assets concurrently; each result is independent.
    pub async fn analyze_many(
        &self,
        requests: Vec<AnalysisRequest>,
    ) -> Vec<Result<Delivery<SeriesAnalysis>, CoreError>> {
        self.coordinator.analyze_many(requests).await
    }

    /// Fetch the market listing and regenerate insights.
    pub async fn refresh_insights(&self) -> Result<Delivery<Vec<Insight>>, CoreError> {
        self.coordinator.refresh_insights().await
    }

    /// Regenerate insights from an externally supplied snapshot batch.
    pub fn accept_snapshots(&self, snapshots: &[AssetSnapshot]) -> Delivery<Vec<Insight>> {
        self.coordinator.accept_snapshots(snapshots)
    }

    #[must_use]
    pub fn latest_analysis(&self, slot: &str) -> Option<SeriesAnalysis> {
        self.coordinator.latest_analysis(slot)
    }

    #[must_use]
    pub fn latest_insights(&self) -> Option<Vec<Insight>> {
        self.coordinator.latest_insights()
    }

    /// Forget a slot's analysis (e.g. when an asset leaves the view).
    pub fn evict_analysis(&self, slot: &str) -> Option<SeriesAnalysis> {
        self.coordinator.evict_analysis(slot)
    }

    #[must_use]
    pub fn analysis_slots(&self) -> usize {
        self.coordinator.analysis_slots()
    }
}
