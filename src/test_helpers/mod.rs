//! A set of helpers for testing

mod database;
mod query_spec;

pub use database::TestDatabase;
pub use query_spec::QuerySpecBuilder;
