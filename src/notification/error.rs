//! Error types for the notification service.

use thiserror::Error;

use crate::http_client::HttpClientError;

/// Defines the possible errors that can occur while delivering a
/// notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// An error originating from building the HTTP client.
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] HttpClientError),

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("Delivery to {endpoint} failed: {source}")]
    Transport {
        /// The endpoint the message was sent to.
        endpoint: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a status outside the success class.
    #[error("Delivery to {endpoint} was rejected with status {status}: {body}")]
    Rejected {
        /// The endpoint the message was sent to.
        endpoint: String,
        /// The HTTP status code returned.
        status: u16,
        /// The start of the response body, for diagnostics.
        body: String,
    },
}
