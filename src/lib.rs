#![warn(missing_docs)]
//! sqlal watches a set of SQL queries and sends a webhook notification
//! whenever a query starts returning rows it has not reported before.

pub mod cmd;
pub mod config;
pub mod engine;
pub mod http_client;
pub mod models;
pub mod notification;
pub mod paths;
pub mod persistence;
pub mod providers;
pub mod supervisor;
pub mod test_helpers;
