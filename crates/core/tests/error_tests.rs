// ═══════════════════════════════════════════════════════════════════
// Error Tests: CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use market_insight_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn malformed_payload() {
        let err = CoreError::malformed("CoinGecko", "missing `prices` array");
        assert_eq!(
            err.to_string(),
            "Malformed payload (CoinGecko): missing `prices` array"
        );
    }

    #[test]
    fn network() {
        let err = CoreError::Network("timed out".into());
        assert_eq!(err.to_string(), "Network error: timed out");
    }

    #[test]
    fn api() {
        let err = CoreError::Api {
            provider: "Yahoo Finance".into(),
            status: 404,
            message: "ZZZZ not found or API error".into(),
        };
        assert_eq!(
            err.to_string(),
            "API error (Yahoo Finance, status 404): ZZZZ not found or API error"
        );
    }

    #[test]
    fn no_provider() {
        let err = CoreError::NoProvider("market listing".into());
        assert_eq!(err.to_string(), "No provider registered for: market listing");
    }

    #[test]
    fn invalid_symbol_is_quoted() {
        let err = CoreError::InvalidSymbol("  ".into());
        assert_eq!(err.to_string(), "Invalid symbol: \"  \"");
    }

    #[test]
    fn unsupported_timeframe() {
        let err = CoreError::UnsupportedTimeframe(14);
        assert_eq!(
            err.to_string(),
            "Unsupported timeframe: 14 days (expected 1, 7, 30, 90 or 365)"
        );
    }

    #[test]
    fn invalid_settings() {
        let err = CoreError::InvalidSettings("trend.short_window must be at least 1".into());
        assert_eq!(err.to_string(), "Invalid settings: trend.short_window must be at least 1");
    }

    #[test]
    fn config() {
        let err = CoreError::Config("settings.json: not found".into());
        assert_eq!(err.to_string(), "Config error: settings.json: not found");
    }
}

// ── Classification ──────────────────────────────────────────────────

mod classification {
    use super::*;

    #[test]
    fn fetch_failures_are_network() {
        assert!(CoreError::Network("reset".into()).is_network());
        assert!(CoreError::Api {
            provider: "CoinGecko".into(),
            status: 429,
            message: "rate limited".into(),
        }
        .is_network());
    }

    #[test]
    fn other_failures_are_not_network() {
        assert!(!CoreError::malformed("CoinGecko", "x").is_network());
        assert!(!CoreError::NoProvider("x".into()).is_network());
        assert!(!CoreError::UnsupportedTimeframe(2).is_network());
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::Config(ref m) if m.contains("no such file")));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
        assert!(err.to_string().starts_with("Deserialization error: "));
    }

    #[test]
    fn question_mark_converts() {
        fn parse() -> Result<serde_json::Value, CoreError> {
            Ok(serde_json::from_str("[1, 2")?)
        }
        assert!(matches!(parse(), Err(CoreError::Deserialization(_))));
    }

    #[test]
    fn implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(CoreError::Network("x".into()));
        assert_eq!(err.to_string(), "Network error: x");
    }
}
