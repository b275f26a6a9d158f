//! Shared reqwest plumbing

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::shared::errors::ServiceError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn build_client(timeout: Duration) -> Result<Client, ServiceError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("suiswap/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ServiceError::Network(format!("Failed to create HTTP client: {}", e)))
}

/// POST a JSON body and decode a JSON answer. Non-2xx answers become
/// [`ServiceError::Status`] so callers can report the status code.
pub async fn post_json<B, T>(client: &Client, url: &str, body: &B) -> Result<T, ServiceError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    debug!("POST {}", url);
    let response = client.post(url).json(body).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}
