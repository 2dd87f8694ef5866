// Shared HTTP plumbing for the backends.
//
// One blocking client per provider instance. No retries: a failed call is
// recorded against its sheet and the run moves on.

use std::time::Duration;

use docdiff_config::{ConfigError, ProviderKind};
use serde::de::DeserializeOwned;

use crate::error::CompareError;

pub(crate) const USER_AGENT: &str = concat!("docdiff/", env!("CARGO_PKG_VERSION"));

/// Largest slice of an error body kept in a `CompareError`
const MAX_ERROR_BODY: usize = 2_000;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::blocking::Client, ConfigError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ConfigError::InvalidValue {
            name: "http client".to_string(),
            value: e.to_string(),
        })
}

/// Send a request and decode a successful JSON envelope.
///
/// Transport failures carry no status. Non-2xx responses carry the status
/// and the raw body. A 2xx body that does not decode is also a provider
/// error, since the envelope (not the completion text) is at fault.
pub(crate) fn send_json<T: DeserializeOwned>(
    provider: ProviderKind,
    request: reqwest::blocking::RequestBuilder,
) -> Result<T, CompareError> {
    let response = request.send().map_err(|e| CompareError::Provider {
        provider,
        status: None,
        message: e.to_string(),
    })?;

    let status = response.status();
    let body = response.text().map_err(|e| CompareError::Provider {
        provider,
        status: Some(status.as_u16()),
        message: format!("failed to read response body: {}", e),
    })?;

    if !status.is_success() {
        log::debug!("{} returned HTTP {}", provider.name(), status.as_u16());
        return Err(CompareError::Provider {
            provider,
            status: Some(status.as_u16()),
            message: clip(&body).to_string(),
        });
    }

    serde_json::from_str(&body).map_err(|e| CompareError::Provider {
        provider,
        status: Some(status.as_u16()),
        message: format!("unexpected response envelope: {}", e),
    })
}

fn clip(body: &str) -> &str {
    crate::prompt::truncate_chars(body.trim(), MAX_ERROR_BODY)
}
