//! Execution of monitored queries against the database.

pub mod sql;
pub mod traits;

pub use sql::SqlQueryExecutor;
pub use traits::{QueryError, QueryExecutor};
