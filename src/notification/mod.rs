//! Delivery of detection messages to HTTP endpoints.
//!
//! A message is `"<query name>: "` followed by the configured template
//! rendered with the number of new identifiers. It goes to the query's own
//! endpoint when one is configured, else to the base endpoint.

pub mod error;
pub mod webhook;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

pub use error::NotificationError;
pub use webhook::HttpNotifier;

use crate::models::{NotificationSettings, QuerySpec};

/// Body of the one-time notification sent when monitoring starts.
pub const STARTUP_MESSAGE: &str = "Monitoring server started";

/// Delivers a text message to an endpoint.
///
/// Success means the endpoint acknowledged the message; there is no retry
/// inside a notifier.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `message` to `endpoint`.
    async fn send(&self, endpoint: &str, message: &str) -> Result<(), NotificationError>;
}

/// The endpoint notifications for `spec` go to.
pub fn resolve_endpoint<'a>(settings: &'a NotificationSettings, spec: &'a QuerySpec) -> &'a str {
    match spec.notification_url.as_deref() {
        Some(url) if !url.trim().is_empty() => url,
        _ => &settings.base_url,
    }
}

/// The message announcing `count` new rows for `spec`.
pub fn compose_message(settings: &NotificationSettings, spec: &QuerySpec, count: usize) -> String {
    format!("{}: {}", spec.name, settings.message_template.render(count))
}
