//! The storage interface for already-notified row identifiers.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::error::PersistenceError;
use crate::models::IdentifierSet;

/// Durable record of which row identifiers have already triggered a
/// notification, scoped per query name.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentifierStore: Send + Sync {
    /// Returns the identifiers previously saved for `name`.
    ///
    /// A query that has never been saved yields an empty set. A record that
    /// exists but cannot be parsed is a `PersistenceError::MalformedState`.
    async fn load(&self, name: &str) -> Result<IdentifierSet, PersistenceError>;

    /// Replaces the record for `name` with `ids`.
    ///
    /// A crash during `save` leaves either the previous or the new record
    /// readable, never a partial one.
    async fn save(&self, name: &str, ids: &IdentifierSet) -> Result<(), PersistenceError>;
}
