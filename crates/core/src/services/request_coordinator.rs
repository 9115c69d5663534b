use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::insight::Insight;
use crate::models::price::TimeSeries;
use crate::models::snapshot::AssetSnapshot;
use crate::models::timeframe::Timeframe;
use crate::models::trend::TrendReport;
use crate::providers::registry::ProviderRegistry;
use crate::providers::traits::ProviderTag;
use super::insight_generator::InsightGenerator;
use super::series_normalizer::SeriesNormalizer;
use super::trend_analyzer::TrendAnalyzer;

// ── Relevance tokens ────────────────────────────────────────────────

/// Tags one in-flight request. Only the newest token issued for a subject
/// may write that subject's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken<K> {
    subject: K,
    seq: u64,
}

impl<K> RequestToken<K> {
    pub fn subject(&self) -> &K {
        &self.subject
    }

    /// Issue order across all subjects; strictly increasing.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What happened to a finished request's result.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery<V> {
    /// The result was current and is now the subject's latest value.
    Applied(V),
    /// A newer request for the same subject was issued; the result was discarded.
    Stale,
}

impl<V> Delivery<V> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Delivery::Applied(_))
    }

    pub fn applied(self) -> Option<V> {
        match self {
            Delivery::Applied(v) => Some(v),
            Delivery::Stale => None,
        }
    }
}

struct Slot<V> {
    newest: u64,
    value: Option<V>,
}

struct SlotState<K, V> {
    next_seq: u64,
    slots: HashMap<K, Slot<V>>,
}

/// Last-write-wins result slots, one per subject.
///
/// `begin` hands out a token and marks it as the subject's newest request;
/// `complete` stores a value only if its token is still the newest. A slow
/// older request can therefore never overwrite a newer one's result.
///
/// Slots live until `evict` is called; callers analyzing an open-ended set of
/// subjects should evict the ones they no longer show.
pub struct LatestResults<K, V> {
    state: Mutex<SlotState<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> LatestResults<K, V> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                next_seq: 0,
                slots: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState<K, V>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a request for `subject`, superseding any request still in flight.
    pub fn begin(&self, subject: K) -> RequestToken<K> {
        let mut state = self.lock();
        state.next_seq += 1;
        let seq = state.next_seq;
        state
            .slots
            .entry(subject.clone())
            .or_insert(Slot {
                newest: 0,
                value: None,
            })
            .newest = seq;
        RequestToken { subject, seq }
    }

    pub fn is_current(&self, token: &RequestToken<K>) -> bool {
        self.lock()
            .slots
            .get(&token.subject)
            .is_some_and(|slot| slot.newest == token.seq)
    }

    /// Offer a finished result. Stored and returned as `Applied` only if the
    /// token is still the newest for its subject.
    pub fn complete(&self, token: &RequestToken<K>, value: V) -> Delivery<V> {
        let mut state = self.lock();
        match state.slots.get_mut(&token.subject) {
            Some(slot) if slot.newest == token.seq => {
                slot.value = Some(value.clone());
                Delivery::Applied(value)
            }
            _ => Delivery::Stale,
        }
    }

    /// The most recently accepted value for `subject`.
    pub fn latest(&self, subject: &K) -> Option<V> {
        self.lock()
            .slots
            .get(subject)
            .and_then(|slot| slot.value.clone())
    }

    /// Drop `subject`'s slot, returning its last value. A request for it that
    /// is still in flight completes as `Stale`.
    pub fn evict(&self, subject: &K) -> Option<V> {
        self.lock().slots.remove(subject).and_then(|slot| slot.value)
    }

    /// Number of subjects with a slot.
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for LatestResults<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Pipeline ────────────────────────────────────────────────────────

/// One fetch → normalize → analyze job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub provider: ProviderTag,
    /// Provider symbol: CoinGecko coin id ("bitcoin") or Yahoo ticker ("AAPL")
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl AnalysisRequest {
    pub fn new(provider: ProviderTag, symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            provider,
            symbol: symbol.into(),
            timeframe,
        }
    }

    /// Per-asset slot key, e.g. "CoinGecko:bitcoin".
    pub fn subject_key(&self) -> String {
        format!("{}:{}", self.provider, self.symbol.trim().to_lowercase())
    }
}

/// A normalized series with its trend report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesAnalysis {
    pub request: AnalysisRequest,
    pub series: TimeSeries,
    /// `None` when the payload held no usable points
    pub report: Option<TrendReport>,
}

/// Thin orchestration shell around the pure services.
///
/// Each call runs one independent pipeline that only suspends while fetching.
/// Results are applied last-write-wins per slot. Errors are never retried here,
/// and an error from a superseded request is discarded like its result would be.
pub struct RequestCoordinator {
    registry: ProviderRegistry,
    normalizer: SeriesNormalizer,
    analyzer: TrendAnalyzer,
    insight_generator: InsightGenerator,
    snapshot_limit: usize,
    analyses: LatestResults<String, SeriesAnalysis>,
    insights: LatestResults<(), Vec<Insight>>,
}

impl RequestCoordinator {
    pub fn new(
        registry: ProviderRegistry,
        analyzer: TrendAnalyzer,
        insight_generator: InsightGenerator,
        snapshot_limit: usize,
    ) -> Self {
        Self {
            registry,
            normalizer: SeriesNormalizer::new(),
            analyzer,
            insight_generator,
            snapshot_limit,
            analyses: LatestResults::new(),
            insights: LatestResults::new(),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Run a pipeline whose result belongs in `slot` (e.g. "detail" for a
    /// single detail view, or `request.subject_key()` for per-asset lists).
    pub async fn analyze(
        &self,
        slot: &str,
        request: AnalysisRequest,
    ) -> Result<Delivery<SeriesAnalysis>, CoreError> {
        let token = self.analyses.begin(slot.to_string());

        match self.run_pipeline(request).await {
            Ok(analysis) => {
                let delivery = self.analyses.complete(&token, analysis);
                if !delivery.is_applied() {
                    debug!(slot, seq = token.seq(), "discarding stale analysis");
                }
                Ok(delivery)
            }
            Err(e) if !self.analyses.is_current(&token) => {
                debug!(slot, seq = token.seq(), error = %e, "discarding stale failure");
                Ok(Delivery::Stale)
            }
            Err(e) => Err(e),
        }
    }

    /// Run several pipelines concurrently, each in its own slot
    /// (`subject_key()`). Results come back in request order; one failure
    /// does not affect the others.
    pub async fn analyze_many(
        &self,
        requests: Vec<AnalysisRequest>,
    ) -> Vec<Result<Delivery<SeriesAnalysis>, CoreError>> {
        let jobs = requests.into_iter().map(|request| async move {
            let slot = request.subject_key();
            self.analyze(&slot, request).await
        });
        join_all(jobs).await
    }

    /// Fetch the market listing and regenerate insights from it.
    pub async fn refresh_insights(&self) -> Result<Delivery<Vec<Insight>>, CoreError> {
        let token = self.insights.begin(());

        let fetched = match self.registry.snapshot_source() {
            Ok(source) => source.fetch_snapshots(self.snapshot_limit).await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(snapshots) => Ok(self.deliver_insights(&token, &snapshots)),
            Err(e) if !self.insights.is_current(&token) => {
                debug!(error = %e, "discarding stale listing failure");
                Ok(Delivery::Stale)
            }
            Err(e) => {
                warn!(error = %e, "market listing fetch failed");
                Err(e)
            }
        }
    }

    /// Regenerate insights from a batch supplied by the caller.
    pub fn accept_snapshots(&self, snapshots: &[AssetSnapshot]) -> Delivery<Vec<Insight>> {
        let token = self.insights.begin(());
        self.deliver_insights(&token, snapshots)
    }

    pub fn latest_analysis(&self, slot: &str) -> Option<SeriesAnalysis> {
        self.analyses.latest(&slot.to_string())
    }

    pub fn latest_insights(&self) -> Option<Vec<Insight>> {
        self.insights.latest(&())
    }

    /// Forget `slot`'s result. An in-flight request for it will be `Stale`.
    pub fn evict_analysis(&self, slot: &str) -> Option<SeriesAnalysis> {
        self.analyses.evict(&slot.to_string())
    }

    /// Number of analysis slots currently held.
    pub fn analysis_slots(&self) -> usize {
        self.analyses.len()
    }

    fn deliver_insights(
        &self,
        token: &RequestToken<()>,
        snapshots: &[AssetSnapshot],
    ) -> Delivery<Vec<Insight>> {
        let insights = self.insight_generator.generate(snapshots);
        info!(assets = snapshots.len(), insights = insights.len(), "generated insights");
        self.insights.complete(token, insights)
    }

    async fn run_pipeline(&self, request: AnalysisRequest) -> Result<SeriesAnalysis, CoreError> {
        let provider = self.registry.get(request.provider)?;

        let raw = provider
            .fetch_series(&request.symbol, request.timeframe)
            .await
            .inspect_err(|e| warn!(provider = provider.name(), symbol = %request.symbol, error = %e, "fetch failed"))?;

        let series = self.normalizer.normalize(request.provider, &raw)?;
        let report = self.analyzer.analyze(&series);
        if report.is_none() {
            info!(provider = provider.name(), symbol = %request.symbol, "series has no usable points");
        }

        Ok(SeriesAnalysis {
            request,
            series,
            report,
        })
    }
}
