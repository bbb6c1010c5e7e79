//! `sqlal check`: evaluate every enabled query once without side effects.
//!
//! The report shows, per query, how many identifiers the query returned and
//! how many of them would be announced. Nothing is sent and nothing is saved.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::{
    config::{AppConfig, ConfigError},
    engine::new_identifiers,
    models::QuerySpec,
    notification::{compose_message, resolve_endpoint},
    persistence::{error::PersistenceError, open_store, traits::IdentifierStore},
    providers::{QueryError, QueryExecutor, SqlQueryExecutor},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database connection error: {0}")]
    Connection(#[from] QueryError),
    #[error("Identifier store error: {0}")]
    State(#[from] PersistenceError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What one query would produce in a real cycle.
#[derive(Debug, Serialize)]
pub struct QueryCheck {
    pub name: String,
    pub endpoint: String,
    pub found: usize,
    pub new: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The output of a check run.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub queries: Vec<QueryCheck>,
}

/// Loads the configuration at `config_path`, evaluates every enabled query
/// once and prints the report as JSON.
pub async fn execute(config_path: &Path) -> Result<(), Error> {
    let config = AppConfig::load(config_path)?;
    let url = config.database.connection_url()?;
    let executor = SqlQueryExecutor::connect(&url, config.database.max_connections).await?;
    let store = open_store(&config).await?;

    let report = check(&config, store.as_ref(), &executor).await;
    executor.close().await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Evaluates the enabled queries of `config` against the current state.
/// Read-only: the store is only loaded from.
pub async fn check<S, Q>(config: &AppConfig, store: &S, executor: &Q) -> CheckReport
where
    S: IdentifierStore + ?Sized,
    Q: QueryExecutor + ?Sized,
{
    let settings = config.notification_settings();
    let mut queries = Vec::new();

    for spec in config.enabled_queries() {
        let endpoint = resolve_endpoint(&settings, spec).to_string();
        let entry = match evaluate(store, executor, spec).await {
            Ok((found, new)) => QueryCheck {
                name: spec.name.clone(),
                endpoint,
                found,
                new,
                message: (new > 0).then(|| compose_message(&settings, spec, new)),
                error: None,
            },
            Err(error) => {
                tracing::warn!(query = %spec.name, error = %error, "Check failed for query.");
                QueryCheck {
                    name: spec.name.clone(),
                    endpoint,
                    found: 0,
                    new: 0,
                    message: None,
                    error: Some(error),
                }
            }
        };
        queries.push(entry);
    }

    CheckReport { queries }
}

async fn evaluate<S, Q>(store: &S, executor: &Q, spec: &QuerySpec) -> Result<(usize, usize), String>
where
    S: IdentifierStore + ?Sized,
    Q: QueryExecutor + ?Sized,
{
    let seen = store.load(&spec.name).await.map_err(|e| e.to_string())?;
    let found = executor.run(&spec.query).await.map_err(|e| e.to_string())?;
    let total = found.len();
    Ok((total, new_identifiers(found, &seen).len()))
}
