//! Shared HTTP plumbing for feed adapters.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::types::ProviderError;

/// Create the client shared by all adapters.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.to_string())
        .build()
        .map_err(|err| ProviderError::Network(format!("failed to create HTTP client: {err}")))
}

fn classify(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(err.to_string())
    }
}

/// Send `request` and decode a JSON body.
///
/// Transport failures map to `Network`/`Timeout`, non-2xx to `BadStatus`,
/// and a body that does not match `T` to `Unparseable`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<T, ProviderError> {
    let response = request.timeout(timeout).send().await.map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::BadStatus(status.as_u16()));
    }

    let body = response.text().await.map_err(classify)?;
    serde_json::from_str(&body).map_err(|err| ProviderError::Unparseable(err.to_string()))
}

/// Google-style in-band status: `OK` and `ZERO_RESULTS` are success.
pub(crate) fn check_google_status(status: &str, error_message: Option<&str>) -> Result<(), ProviderError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(ProviderError::Rejected {
            status: other.to_string(),
            message: error_message.unwrap_or("no error message").to_string(),
        }),
    }
}

/// Decode each element independently, dropping the ones that do not fit.
pub(crate) fn lenient_items<T: DeserializeOwned>(items: Vec<serde_json::Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}
