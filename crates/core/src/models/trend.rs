use serde::{Deserialize, Serialize};

/// Discrete trend label derived from comparing short- and long-term averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendClassification {
    Bullish,
    Bearish,
    Neutral,
}

impl TrendClassification {
    /// Plain-language reading of the label for the presentation layer.
    pub fn summary(self) -> &'static str {
        match self {
            TrendClassification::Bullish => {
                "Short-term average is above long-term average, indicating upward momentum"
            }
            TrendClassification::Bearish => {
                "Short-term average is below long-term average, indicating downward pressure"
            }
            TrendClassification::Neutral => {
                "Short-term and long-term averages are aligned, indicating stable movement"
            }
        }
    }
}

impl std::fmt::Display for TrendClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendClassification::Bullish => write!(f, "Bullish"),
            TrendClassification::Bearish => write!(f, "Bearish"),
            TrendClassification::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Trend metrics for one non-empty series. Recomputed per request, never stored.
///
/// All values are raw numbers; formatting belongs to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    /// Mean of the last `min(short_window, len)` prices
    pub short_term_average: f64,

    /// Mean of all prices
    pub long_term_average: f64,

    /// (short − long) / long × 100, or 0 when the long-term mean is 0
    pub trend_difference_percent: f64,

    pub classification: TrendClassification,

    /// Price of the last point
    pub current_price: f64,

    /// (last − first) / first × 100, or 0 when the first price is 0
    pub overall_change_percent: f64,

    pub highest_price: f64,
    pub lowest_price: f64,

    /// Number of points the report was computed from
    pub sample_count: usize,
}
