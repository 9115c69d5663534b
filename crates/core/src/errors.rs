use thiserror::Error;

/// Unified error type for the entire market-insight-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// An empty series is not an error: `TrendAnalyzer` answers `None` for it.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Normalization ───────────────────────────────────────────────
    #[error("Malformed payload ({provider}): {message}")]
    MalformedPayload {
        provider: String,
        message: String,
    },

    // ── API / Network ───────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({provider}, status {status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("No provider registered for: {0}")]
    NoProvider(String),

    // ── Request validation ──────────────────────────────────────────
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Unsupported timeframe: {0} days (expected 1, 7, 30, 90 or 365)")]
    UnsupportedTimeframe(u32),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// Shorthand used by the provider adapters.
    pub fn malformed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::MalformedPayload {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// True for failures detected at the fetch boundary, before normalization.
    pub fn is_network(&self) -> bool {
        matches!(self, CoreError::Network(_) | CoreError::Api { .. })
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; drop the query so API keys never leak.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
