use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Lookback range requested from a provider.
///
/// This drives how much history is fetched, not the short-term averaging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum Timeframe {
    OneDay,
    #[default]
    SevenDays,
    OneMonth,
    ThreeMonths,
    OneYear,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::OneDay,
        Timeframe::SevenDays,
        Timeframe::OneMonth,
        Timeframe::ThreeMonths,
        Timeframe::OneYear,
    ];

    /// Day count sent to day-based APIs (CoinGecko `days=`).
    pub fn days(self) -> u32 {
        match self {
            Timeframe::OneDay => 1,
            Timeframe::SevenDays => 7,
            Timeframe::OneMonth => 30,
            Timeframe::ThreeMonths => 90,
            Timeframe::OneYear => 365,
        }
    }

    /// Short label for timeframe selectors.
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::OneDay => "24H",
            Timeframe::SevenDays => "7D",
            Timeframe::OneMonth => "1M",
            Timeframe::ThreeMonths => "3M",
            Timeframe::OneYear => "1Y",
        }
    }

    /// Range token for Yahoo's chart endpoint (`range=`).
    pub fn yahoo_range(self) -> &'static str {
        match self {
            Timeframe::OneDay => "1d",
            Timeframe::SevenDays => "5d",
            Timeframe::OneMonth => "1mo",
            Timeframe::ThreeMonths => "3mo",
            Timeframe::OneYear => "1y",
        }
    }
}

impl TryFrom<u32> for Timeframe {
    type Error = CoreError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        Timeframe::ALL
            .into_iter()
            .find(|t| t.days() == days)
            .ok_or(CoreError::UnsupportedTimeframe(days))
    }
}

impl From<Timeframe> for u32 {
    fn from(t: Timeframe) -> Self {
        t.days()
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
