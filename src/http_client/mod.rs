//! This module builds the HTTP client used to deliver notifications.
//!
//! Delivery has no built-in retry: a failed notification is retried by the
//! next monitoring cycle, so the client only carries pooling and timeouts.

use reqwest::Client;
use thiserror::Error;

use crate::config::BaseHttpClientConfig;

/// Errors that can occur while building the HTTP client.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// An error occurred while building the underlying `reqwest::Client`.
    #[error("Failed to create HTTP client: {0}")]
    HttpClientBuildError(String),
}

/// Creates an HTTP client from the base client configuration.
pub fn create_http_client(config: &BaseHttpClientConfig) -> Result<Client, HttpClientError> {
    Client::builder()
        .pool_max_idle_per_host(config.max_idle_per_host)
        .pool_idle_timeout(Some(config.idle_timeout))
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| HttpClientError::HttpClientBuildError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_http_client_with_defaults() {
        assert!(create_http_client(&BaseHttpClientConfig::default()).is_ok());
    }
}
