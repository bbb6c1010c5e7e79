//! A builder for creating `QuerySpec` instances in tests.

use crate::models::QuerySpec;

/// A builder for creating `QuerySpec` instances in tests.
pub struct QuerySpecBuilder {
    name: String,
    query: Option<String>,
    notification_url: Option<String>,
    enabled: bool,
}

impl QuerySpecBuilder {
    /// Creates a new `QuerySpecBuilder` for an enabled query named `name`.
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), query: None, notification_url: None, enabled: true }
    }

    /// Sets the SQL statement.
    pub fn query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    /// Sets the per-query notification endpoint.
    pub fn notification_url(mut self, url: &str) -> Self {
        self.notification_url = Some(url.to_string());
        self
    }

    /// Enables or disables the query.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builds the `QuerySpec`.
    pub fn build(self) -> QuerySpec {
        QuerySpec {
            query: self
                .query
                .unwrap_or_else(|| format!("SELECT id FROM {}", self.name.to_lowercase())),
            name: self.name,
            notification_url: self.notification_url,
            enabled: self.enabled,
        }
    }
}
