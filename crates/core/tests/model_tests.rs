use chrono::{Datelike, TimeZone, Utc};
use serde_json::json;
use std::io::Write;

use market_insight_core::errors::CoreError;
use market_insight_core::models::insight::{InsightKind, Severity};
use market_insight_core::models::price::{PricePoint, TimeSeries};
use market_insight_core::models::settings::{AnalysisSettings, InsightSettings, TrendSettings};
use market_insight_core::models::snapshot::AssetSnapshot;
use market_insight_core::models::timeframe::Timeframe;

// ═══════════════════════════════════════════════════════════════════
//  PricePoint / TimeSeries
// ═══════════════════════════════════════════════════════════════════

mod price {
    use super::*;

    #[test]
    fn new_point_has_zero_volume_and_market_cap() {
        let p = PricePoint::new(1_000, 2.5);
        assert_eq!(p.volume, 0.0);
        assert_eq!(p.market_cap, 0.0);

        let p = p.with_volume(7.0).with_market_cap(9.0);
        assert_eq!((p.volume, p.market_cap), (7.0, 9.0));
    }

    #[test]
    fn datetime_from_millis() {
        let p = PricePoint::new(1_700_000_000_000, 1.0);
        assert_eq!(
            p.datetime().unwrap(),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap()
        );
        assert_eq!(p.datetime().unwrap().year(), 2023);
    }

    #[test]
    fn accessors() {
        let series = TimeSeries::from_points(vec![
            PricePoint::new(1, 10.0),
            PricePoint::new(2, 20.0),
            PricePoint::new(3, 30.0),
        ]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.first().unwrap().price, 10.0);
        assert_eq!(series.last().unwrap().price, 30.0);
        assert_eq!(series.tail(2).len(), 2);
        assert_eq!(series.tail(2)[0].price, 20.0);
        assert_eq!(series.into_points().len(), 3);
    }

    #[test]
    fn empty_series() {
        let series = TimeSeries::empty();
        assert!(series.is_empty());
        assert!(series.first().is_none());
        assert!(series.tail(7).is_empty());
    }

    #[test]
    fn deserialization_restores_ordering() {
        let series: TimeSeries = serde_json::from_value(json!({
            "points": [
                { "timestamp_ms": 2000, "price": 2.0 },
                { "timestamp_ms": 1000, "price": 1.0, "volume": 5.0 }
            ]
        }))
        .unwrap();

        assert_eq!(series.first().unwrap().timestamp_ms, 1000);
        assert_eq!(series.first().unwrap().volume, 5.0);
        assert_eq!(series.last().unwrap().market_cap, 0.0);
    }

    #[test]
    fn serializes_points_in_order() {
        let series = TimeSeries::from_points(vec![PricePoint::new(1, 1.5)]);
        let value = serde_json::to_value(&series).unwrap();
        assert_eq!(value["points"][0]["price"], json!(1.5));
        assert_eq!(value["points"][0]["timestamp_ms"], json!(1));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Timeframe
// ═══════════════════════════════════════════════════════════════════

mod timeframe {
    use super::*;

    #[test]
    fn default_is_seven_days() {
        assert_eq!(Timeframe::default(), Timeframe::SevenDays);
    }

    #[test]
    fn day_counts_round_trip() {
        for t in Timeframe::ALL {
            assert_eq!(Timeframe::try_from(t.days()).unwrap(), t);
        }
    }

    #[test]
    fn unsupported_day_count() {
        assert!(matches!(
            Timeframe::try_from(14),
            Err(CoreError::UnsupportedTimeframe(14))
        ));
        assert!(Timeframe::try_from(0).is_err());
    }

    #[test]
    fn labels_and_yahoo_ranges() {
        let labels: Vec<&str> = Timeframe::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["24H", "7D", "1M", "3M", "1Y"]);
        assert_eq!(Timeframe::SevenDays.yahoo_range(), "5d");
        assert_eq!(Timeframe::OneMonth.yahoo_range(), "1mo");
        assert_eq!(Timeframe::OneYear.to_string(), "1Y");
    }

    #[test]
    fn serde_uses_day_count() {
        assert_eq!(serde_json::to_value(Timeframe::ThreeMonths).unwrap(), json!(90));
        let t: Timeframe = serde_json::from_value(json!(30)).unwrap();
        assert_eq!(t, Timeframe::OneMonth);
        assert!(serde_json::from_value::<Timeframe>(json!(3)).is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  AssetSnapshot
// ═══════════════════════════════════════════════════════════════════

mod snapshot {
    use super::*;

    #[test]
    fn decodes_market_listing_record() {
        let snapshots: Vec<AssetSnapshot> = serde_json::from_value(json!([{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://example.invalid/btc.png",
            "current_price": 67000.5,
            "market_cap": 1.3e12,
            "market_cap_rank": 1,
            "total_volume": 2.1e10,
            "price_change_percentage_24h": -1.25,
            "price_change_percentage_1h_in_currency": 0.1,
            "price_change_percentage_7d_in_currency": 4.5,
            "price_change_percentage_30d_in_currency": null
        }]))
        .unwrap();

        let btc = &snapshots[0];
        assert_eq!(btc.asset_id, "bitcoin");
        assert_eq!(btc.symbol.as_deref(), Some("btc"));
        assert_eq!(btc.market_cap_rank, Some(1));
        assert_eq!(btc.change_24h(), -1.25);
        assert_eq!(btc.change_7d(), 4.5);
        assert_eq!(btc.change_1h_percent, Some(0.1));
        assert_eq!(btc.change_30d_percent, None);
        assert_eq!(btc.change_30d(), 0.0);
    }

    #[test]
    fn absent_name_reads_as_empty() {
        let s: AssetSnapshot = serde_json::from_value(json!({ "id": "anon" })).unwrap();
        assert_eq!(s.name, "");
    }

    #[test]
    fn absent_and_null_figures_read_as_zero() {
        let s: AssetSnapshot = serde_json::from_value(json!({
            "id": "newcoin",
            "name": "New Coin",
            "price_change_percentage_24h": null
        }))
        .unwrap();

        assert_eq!(s.current_price, None);
        assert_eq!(s.change_24h(), 0.0);
        assert_eq!(s.change_7d(), 0.0);
    }

    #[test]
    fn missing_id_is_rejected() {
        assert!(serde_json::from_value::<AssetSnapshot>(json!({ "name": "Nameless" })).is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Insight
// ═══════════════════════════════════════════════════════════════════

mod insight {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(InsightKind::VolatilityWarning.to_string(), "Volatility Warning");
        assert_eq!(InsightKind::TrendReversal.to_string(), "Trend Reversal");
    }

    #[test]
    fn severity_is_distinct() {
        assert_ne!(Severity::Warning, Severity::Info);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = AnalysisSettings::default();
        assert_eq!(s.trend, TrendSettings::default());
        assert_eq!(s.trend.short_window, 7);
        assert_eq!(s.trend.bullish_threshold, 2.0);
        assert_eq!(s.trend.bearish_threshold, -2.0);
        assert_eq!(s.insights.cap, 3);
        assert_eq!(s.insights.volatility_threshold, 5.0);
        assert_eq!(s.insights.reversal_threshold, -5.0);
        assert_eq!(s.default_timeframe, Timeframe::SevenDays);
        assert_eq!(s.vs_currency, "usd");
        assert!(s.yahoo_proxy.is_none());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let s = AnalysisSettings::from_json_str(
            r#"{ "trend": { "short_window": 14 }, "default_timeframe": 30,
                 "api_keys": { "coingecko": "demo-key" } }"#,
        )
        .unwrap();

        assert_eq!(s.trend.short_window, 14);
        assert_eq!(s.trend.bullish_threshold, 2.0);
        assert_eq!(s.insights, InsightSettings::default());
        assert_eq!(s.default_timeframe, Timeframe::OneMonth);
        assert_eq!(s.api_key("coingecko"), Some("demo-key"));
        assert_eq!(s.api_key("yahoo"), None);
    }

    #[test]
    fn empty_object_is_default() {
        let s = AnalysisSettings::from_json_str("{}").unwrap();
        assert_eq!(s.snapshot_limit, AnalysisSettings::default().snapshot_limit);
    }

    #[test]
    fn malformed_json_is_deserialization_error() {
        assert!(matches!(
            AnalysisSettings::from_json_str("{ not json"),
            Err(CoreError::Deserialization(_))
        ));
        assert!(matches!(
            AnalysisSettings::from_json_str(r#"{ "default_timeframe": 14 }"#),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{ "trend": { "short_window": 0 } }"#,
            r#"{ "trend": { "bullish_threshold": -3.0, "bearish_threshold": 3.0 } }"#,
            r#"{ "vs_currency": "  " }"#,
            r#"{ "snapshot_limit": 0 }"#,
        ] {
            assert!(
                matches!(
                    AnalysisSettings::from_json_str(json),
                    Err(CoreError::InvalidSettings(_))
                ),
                "{json}"
            );
        }
    }

    #[test]
    fn non_finite_thresholds_are_rejected() {
        let mut s = AnalysisSettings::default();
        s.trend.bullish_threshold = f64::NAN;
        assert!(s.validate().is_err());

        let mut s = AnalysisSettings::default();
        s.insights.volatility_threshold = f64::INFINITY;
        assert!(s.validate().is_err());
    }

    #[test]
    fn zero_insight_cap_is_allowed() {
        let s = AnalysisSettings::from_json_str(r#"{ "insights": { "cap": 0 } }"#).unwrap();
        assert_eq!(s.insights.cap, 0);
    }

    #[test]
    fn equal_trend_thresholds_are_allowed() {
        let mut s = AnalysisSettings::default();
        s.trend.bullish_threshold = 0.0;
        s.trend.bearish_threshold = 0.0;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "vs_currency": "inr", "snapshot_limit": 25 }}"#).unwrap();

        let s = AnalysisSettings::load_from_file(file.path()).unwrap();
        assert_eq!(s.vs_currency, "inr");
        assert_eq!(s.snapshot_limit, 25);
    }

    #[test]
    fn load_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        match AnalysisSettings::load_from_file(&path) {
            Err(CoreError::Config(msg)) => assert!(msg.contains("absent.json")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn settings_round_trip_through_json() {
        let mut s = AnalysisSettings::default();
        s.yahoo_proxy = Some("https://proxy.example.invalid/fetch".into());
        let json = serde_json::to_string(&s).unwrap();
        let back = AnalysisSettings::from_json_str(&json).unwrap();
        assert_eq!(back.yahoo_proxy, s.yahoo_proxy);
        assert_eq!(back.trend, s.trend);
    }
}
