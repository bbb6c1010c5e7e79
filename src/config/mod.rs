//! Configuration module for sqlal.

mod app_config;
mod database;
mod error;
mod helpers;
mod http_base;
mod state;

pub use app_config::{AppConfig, AppConfigBuilder};
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use helpers::{
    deserialize_duration_from_seconds, deserialize_optional_endpoint,
    serialize_duration_to_seconds,
};
pub use http_base::BaseHttpClientConfig;
pub use state::StateConfig;
