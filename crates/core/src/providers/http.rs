use reqwest::{Client, RequestBuilder, Url};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::warn;

use crate::errors::CoreError;

/// Build a provider HTTP client. Timeouts are not available on WASM.
pub(crate) fn build_client(timeout_secs: u64) -> Client {
    let builder = Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.timeout(Duration::from_secs(timeout_secs));
    #[cfg(target_arch = "wasm32")]
    let _ = timeout_secs;
    builder.build().unwrap_or_else(|_| Client::new())
}

/// Send `request` and decode the body as untyped JSON.
///
/// Transport failures become `Network`; a non-success status or a body that
/// is not JSON becomes `Api`. Nothing here inspects the payload's shape.
pub(crate) async fn get_json(
    request: RequestBuilder,
    provider: &str,
    what: &str,
) -> Result<serde_json::Value, CoreError> {
    let resp = request.send().await?;
    let status = resp.status();

    if !status.is_success() {
        warn!(provider, status = status.as_u16(), what, "provider returned error status");
        return Err(CoreError::Api {
            provider: provider.to_string(),
            status: status.as_u16(),
            message: format!("{what} not found or API error"),
        });
    }

    resp.json().await.map_err(|e| CoreError::Api {
        provider: provider.to_string(),
        status: status.as_u16(),
        message: format!("Failed to parse response for {what}: {e}"),
    })
}

/// Reject blank symbols before any request is made.
pub(crate) fn require_symbol(symbol: &str) -> Result<&str, CoreError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidSymbol(symbol.to_string()));
    }
    Ok(trimmed)
}

/// `base` with `segments` appended as path segments. Each segment is
/// percent-encoded, so a symbol like `BRK/B` stays a single segment.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, CoreError> {
    let mut url = Url::parse(base)
        .map_err(|e| CoreError::Config(format!("invalid base URL {base:?}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| CoreError::Config(format!("base URL {base:?} cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
