use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single normalized observation: epoch milliseconds → price (+ optional volume / market cap).
///
/// Providers that do not report volume or market cap leave them at `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Epoch timestamp in milliseconds, whatever unit the provider used.
    pub timestamp_ms: i64,
    pub price: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub market_cap: f64,
}

impl PricePoint {
    pub fn new(timestamp_ms: i64, price: f64) -> Self {
        Self {
            timestamp_ms,
            price,
            volume: 0.0,
            market_cap: 0.0,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = market_cap;
        self
    }

    /// The timestamp as a UTC datetime, `None` if it is outside chrono's range.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

/// The canonical, provider-independent price series.
///
/// Invariants (upheld by every constructor):
/// - timestamps are non-decreasing
/// - every point carries a price (missing prices are dropped during normalization)
///
/// An empty series is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    points: Vec<PricePoint>,
}

impl TimeSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a series from points in provider order.
    ///
    /// Providers deliver ascending timestamps; if one does not, the points are
    /// stably sorted so equal timestamps keep their relative order.
    pub fn from_points(mut points: Vec<PricePoint>) -> Self {
        let ordered = points
            .windows(2)
            .all(|w| w[0].timestamp_ms <= w[1].timestamp_ms);
        if !ordered {
            points.sort_by_key(|p| p.timestamp_ms);
        }
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Prices in series order.
    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.price)
    }

    /// The most recent `n` points (all of them when `n >= len`).
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }
}

impl<'de> Deserialize<'de> for TimeSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            points: Vec<PricePoint>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(TimeSeries::from_points(raw.points))
    }
}
