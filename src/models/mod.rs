//! This module contains the data models for the sqlal application.

use std::collections::BTreeSet;

pub mod notification;
pub mod query_spec;

pub use notification::{MessageTemplate, MessageTemplateError, NotificationSettings};
pub use query_spec::QuerySpec;

/// A row identifier read from the leading column of a query result.
pub type RowId = i64;

/// An unordered set of row identifiers, kept sorted for stable output.
pub type IdentifierSet = BTreeSet<RowId>;
