//! This module provides the `SupervisorBuilder` for constructing a `Supervisor`.

use std::sync::Arc;

use super::{Supervisor, SupervisorError};
use crate::{
    config::AppConfig,
    engine::SchedulerError,
    notification::{HttpNotifier, Notifier},
    persistence::{open_store, traits::IdentifierStore},
    providers::{QueryExecutor, SqlQueryExecutor},
};

/// A builder for creating a `Supervisor` instance.
#[derive(Default)]
pub struct SupervisorBuilder {
    config: Option<AppConfig>,
    store: Option<Arc<dyn IdentifierStore>>,
    executor: Option<Arc<dyn QueryExecutor>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl SupervisorBuilder {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration for the `Supervisor`.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the identifier store for the `Supervisor`.
    pub fn store(mut self, store: Arc<dyn IdentifierStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the query executor for the `Supervisor`.
    pub fn executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Sets the notifier for the `Supervisor`.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Creates every component not set explicitly from the configuration:
    /// the store named by `state`, a pooled connection to the monitored
    /// database and an HTTP notifier.
    ///
    /// A database that cannot be reached is an error here, before any
    /// notification is sent.
    pub async fn connect(mut self) -> Result<Self, SupervisorError> {
        let config = self.config.as_ref().ok_or(SupervisorError::MissingConfig)?;

        if self.store.is_none() {
            self.store = Some(open_store(config).await?);
        }

        if self.executor.is_none() {
            let url = config.database.connection_url()?;
            tracing::debug!("Connecting to the monitored database...");
            let executor =
                SqlQueryExecutor::connect(&url, config.database.max_connections).await?;
            self.executor = Some(Arc::new(executor));
        }

        if self.notifier.is_none() {
            self.notifier = Some(Arc::new(HttpNotifier::new(&config.http)?));
        }

        Ok(self)
    }

    /// Assembles and validates the components to build a `Supervisor`.
    pub fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;
        let store = self.store.ok_or(SupervisorError::MissingIdentifierStore)?;
        let executor = self.executor.ok_or(SupervisorError::MissingQueryExecutor)?;
        let notifier = self.notifier.ok_or(SupervisorError::MissingNotifier)?;

        if config.check_interval.is_zero() {
            return Err(SchedulerError::InvalidInterval.into());
        }

        Ok(Supervisor::new(config, store, executor, notifier))
    }
}
