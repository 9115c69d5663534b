use serde::{Deserialize, Serialize};

/// Which rule produced an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightKind {
    /// |24h change| above the volatility threshold
    VolatilityWarning,
    /// Up today while the 7-day change is below the reversal threshold
    TrendReversal,
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightKind::VolatilityWarning => write!(f, "Volatility Warning"),
            InsightKind::TrendReversal => write!(f, "Trend Reversal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Info,
}

/// A derived alert about one asset. Regenerated for every snapshot batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,

    /// Id of the asset the alert is about
    pub asset_id: String,

    /// Short headline (e.g., "High Volatility: Bitcoin")
    pub title: String,

    /// One-sentence explanation with the figures that triggered it
    pub message: String,

    pub severity: Severity,
}
