//! Webhook notification implementation.
//!
//! Messages are POSTed as `text/plain`, which is what ntfy-style push
//! services expect.

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{CONTENT_TYPE, HeaderValue},
};

use super::{Notifier, error::NotificationError};
use crate::{config::BaseHttpClientConfig, http_client::create_http_client};

/// Longest prefix of a rejection body kept for the error message.
const MAX_ERROR_BODY: usize = 256;

/// Implementation of notifications via plain-text HTTP POST
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    /// Configured HTTP client for webhook requests
    client: Client,
}

impl HttpNotifier {
    /// Creates a new notifier with a client built from `config`.
    pub fn new(config: &BaseHttpClientConfig) -> Result<Self, NotificationError> {
        Ok(Self { client: create_http_client(config)? })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[tracing::instrument(skip(self, message), level = "debug")]
    async fn send(&self, endpoint: &str, message: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .body(message.to_string())
            .send()
            .await
            .map_err(|source| NotificationError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();

        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(NotificationError::Rejected {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(endpoint, status = status.as_u16(), "Notification delivered.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn create_test_notifier() -> HttpNotifier {
        HttpNotifier::new(&BaseHttpClientConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_plain_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/orders")
            .match_header("content-type", "text/plain")
            .match_body(Matcher::Exact("Orders: New 2 rows".to_string()))
            .with_status(200)
            .create_async()
            .await;

        let notifier = create_test_notifier();
        let result = notifier.send(&format!("{}/orders", server.url()), "Orders: New 2 rows").await;

        assert!(result.is_ok());
        mock.assert();
    }

    #[tokio::test]
    async fn test_any_success_status_is_accepted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").with_status(202).create_async().await;

        let result = create_test_notifier().send(&server.url(), "hello").await;

        assert!(result.is_ok());
        mock.assert();
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(503)
            .with_body("Service Unavailable")
            .expect(1)
            .create_async()
            .await;

        let err = create_test_notifier().send(&server.url(), "hello").await.unwrap_err();

        match err {
            NotificationError::Rejected { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // No retry inside the notifier.
        mock.assert();
    }

    #[tokio::test]
    async fn test_long_rejection_body_is_truncated() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(400)
            .with_body("x".repeat(1000))
            .create_async()
            .await;

        let err = create_test_notifier().send(&server.url(), "hello").await.unwrap_err();
        assert!(matches!(
            err,
            NotificationError::Rejected { body, .. } if body.len() == MAX_ERROR_BODY
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let err = create_test_notifier().send("http://127.0.0.1:1/", "hello").await.unwrap_err();
        assert!(matches!(err, NotificationError::Transport { .. }));
    }
}
