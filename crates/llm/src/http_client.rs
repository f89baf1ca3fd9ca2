//! HTTP Client Factory
//!
//! Builds the reqwest client shared by a provider instance.

use std::time::Duration;

use crate::types::{LlmError, LlmResult};

/// Connection establishment is bounded separately from the whole request.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Build a `reqwest::Client` bounded by `timeout_secs` per request.
///
/// A zero timeout leaves the request unbounded (connect is still bounded).
pub fn build_http_client(timeout_secs: u64) -> LlmResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(concat!("strengths-coach/", env!("CARGO_PKG_VERSION")));
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    builder.build().map_err(|e| LlmError::Other {
        message: format!("Failed to build HTTP client: {}", e),
    })
}
