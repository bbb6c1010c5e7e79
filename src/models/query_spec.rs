//! A single monitored condition.

use serde::{Deserialize, Serialize};

use crate::config::deserialize_optional_endpoint;

fn default_enabled() -> bool {
    true
}

/// One configured SQL query whose first result column yields row identifiers.
///
/// The `name` doubles as the key into the identifier store and as the prefix
/// of every notification sent for this query.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct QuerySpec {
    /// Unique, human-readable name.
    pub name: String,

    /// SQL statement whose leading column is an integer row identifier.
    pub query: String,

    /// Overrides the base notification endpoint for this query only.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_endpoint",
        skip_serializing_if = "Option::is_none"
    )]
    pub notification_url: Option<String>,

    /// Disabled queries are never executed.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl QuerySpec {
    /// Creates an enabled spec without an endpoint override.
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self { name: name.into(), query: query.into(), notification_url: None, enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_defaults_to_true() {
        let spec: QuerySpec =
            serde_json::from_str(r#"{"name": "Orders", "query": "SELECT id FROM orders"}"#)
                .unwrap();
        assert!(spec.enabled);
        assert_eq!(spec.notification_url, None);
    }

    #[test]
    fn test_disabled_spec_with_override() {
        let spec: QuerySpec = serde_json::from_str(
            r#"{
                "name": "Failed jobs",
                "query": "SELECT id FROM jobs WHERE state = 'failed'",
                "notification_url": "https://ntfy.sh/jobs",
                "enabled": false
            }"#,
        )
        .unwrap();
        assert!(!spec.enabled);
        assert_eq!(spec.notification_url.as_deref(), Some("https://ntfy.sh/jobs"));
    }
}
