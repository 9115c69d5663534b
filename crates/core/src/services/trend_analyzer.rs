use crate::models::price::TimeSeries;
use crate::models::settings::TrendSettings;
use crate::models::trend::{TrendClassification, TrendReport};

/// Computes trend reports: short-term vs long-term moving average,
/// overall change, and the price range of a series.
///
/// Pure: the same series and settings always give the same report.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    settings: TrendSettings,
}

impl TrendAnalyzer {
    pub fn new(settings: TrendSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TrendSettings {
        &self.settings
    }

    /// Analyze a series with this analyzer's window and thresholds.
    /// Returns `None` for an empty series.
    pub fn analyze(&self, series: &TimeSeries) -> Option<TrendReport> {
        analyze(
            series,
            self.settings.short_window,
            self.settings.bullish_threshold,
            self.settings.bearish_threshold,
        )
    }
}

/// Analyze `series` with explicit parameters.
///
/// - short-term average: mean of the last `min(short_window, len)` prices
/// - long-term average: mean of all prices
/// - difference: (short − long) / long × 100, defined as 0 when long is 0
/// - Bullish above `bullish_threshold`, Bearish below `bearish_threshold`, else Neutral
/// - overall change: (last − first) / first × 100, defined as 0 when first is 0
///
/// A `short_window` of 0 is treated as 1.
pub fn analyze(
    series: &TimeSeries,
    short_window: usize,
    bullish_threshold: f64,
    bearish_threshold: f64,
) -> Option<TrendReport> {
    let first = series.first()?.price;
    let current_price = series.last()?.price;

    let short_term_average = mean(series.tail(short_window.max(1)).iter().map(|p| p.price));
    let long_term_average = mean(series.prices());

    let trend_difference_percent = percent_change(long_term_average, short_term_average);
    let classification =
        classify(trend_difference_percent, bullish_threshold, bearish_threshold);

    let (lowest_price, highest_price) = series
        .prices()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p), hi.max(p))
        });

    Some(TrendReport {
        short_term_average,
        long_term_average,
        trend_difference_percent,
        classification,
        current_price,
        overall_change_percent: percent_change(first, current_price),
        highest_price,
        lowest_price,
        sample_count: series.len(),
    })
}

/// Label a difference (%) against the thresholds. Both comparisons are strict.
pub fn classify(
    difference_percent: f64,
    bullish_threshold: f64,
    bearish_threshold: f64,
) -> TrendClassification {
    if difference_percent > bullish_threshold {
        TrendClassification::Bullish
    } else if difference_percent < bearish_threshold {
        TrendClassification::Bearish
    } else {
        TrendClassification::Neutral
    }
}

/// (to − from) / from × 100; a zero base yields 0.
fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (to - from) * 100.0 / from
}

/// Running mean; exact for a constant sequence.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut avg = 0.0;
    for (i, v) in values.enumerate() {
        avg += (v - avg) / (i + 1) as f64;
    }
    avg
}
