use crate::models::insight::{Insight, InsightKind, Severity};
use crate::models::settings::InsightSettings;
use crate::models::snapshot::AssetSnapshot;

/// Scans a batch of asset snapshots and produces a short list of alerts.
///
/// Rules run in a fixed order, each over the whole batch in input order:
/// 1. volatility: |24h change| > `volatility_threshold`
/// 2. reversal: 24h change > 0 and 7d change < `reversal_threshold`
///
/// The concatenated list is cut to the first `cap` entries; nothing is
/// re-ranked. Missing change figures count as 0, so generation never fails.
#[derive(Debug, Clone, Default)]
pub struct InsightGenerator {
    settings: InsightSettings,
}

impl InsightGenerator {
    pub fn new(settings: InsightSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &InsightSettings {
        &self.settings
    }

    pub fn generate(&self, snapshots: &[AssetSnapshot]) -> Vec<Insight> {
        generate(
            snapshots,
            self.settings.cap,
            self.settings.volatility_threshold,
            self.settings.reversal_threshold,
        )
    }
}

/// Generate insights with explicit parameters.
pub fn generate(
    snapshots: &[AssetSnapshot],
    cap: usize,
    volatility_threshold: f64,
    reversal_threshold: f64,
) -> Vec<Insight> {
    let volatility = snapshots
        .iter()
        .filter(|s| s.change_24h().abs() > volatility_threshold)
        .map(volatility_warning);

    let reversals = snapshots
        .iter()
        .filter(|s| s.change_24h() > 0.0 && s.change_7d() < reversal_threshold)
        .map(trend_reversal);

    // Every volatility warning precedes every reversal.
    volatility.chain(reversals).take(cap).collect()
}

fn volatility_warning(snapshot: &AssetSnapshot) -> Insight {
    Insight {
        kind: InsightKind::VolatilityWarning,
        asset_id: snapshot.asset_id.clone(),
        title: format!("High Volatility: {}", snapshot.name),
        message: format!(
            "{} has moved {:.2}% in 24h",
            snapshot.name,
            snapshot.change_24h()
        ),
        severity: Severity::Warning,
    }
}

fn trend_reversal(snapshot: &AssetSnapshot) -> Insight {
    Insight {
        kind: InsightKind::TrendReversal,
        asset_id: snapshot.asset_id.clone(),
        title: format!("Trend Reversal: {}", snapshot.name),
        message: format!(
            "Up {:.2}% today but down {:.2}% over 7 days",
            snapshot.change_24h(),
            snapshot.change_7d().abs()
        ),
        severity: Severity::Info,
    }
}
