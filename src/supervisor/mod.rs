//! The Supervisor module manages the lifecycle of the monitoring process.
//!
//! It owns the configuration and the three services the loop needs (the
//! identifier store, the query executor and the notifier), announces startup,
//! runs the scheduler until a shutdown signal arrives, and releases the
//! database pool on the way out.

mod builder;

use std::sync::Arc;

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::{signal, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    config::{AppConfig, ConfigError},
    engine::{CycleOrchestrator, Scheduler, SchedulerError},
    notification::{NotificationError, Notifier, STARTUP_MESSAGE},
    persistence::{error::PersistenceError, traits::IdentifierStore},
    providers::{QueryError, QueryExecutor},
};

/// Represents the set of errors that can occur during the supervisor's
/// operation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// An identifier store was not provided to the `SupervisorBuilder`.
    #[error("Missing identifier store for Supervisor")]
    MissingIdentifierStore,

    /// A query executor was not provided to the `SupervisorBuilder`.
    #[error("Missing query executor for Supervisor")]
    MissingQueryExecutor,

    /// A notifier was not provided to the `SupervisorBuilder`.
    #[error("Missing notifier for Supervisor")]
    MissingNotifier,

    /// The configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The monitored database could not be reached at startup.
    #[error("Database connection failed: {0}")]
    Connection(#[from] QueryError),

    /// The identifier store could not be opened.
    #[error("Identifier store unavailable: {0}")]
    State(#[from] PersistenceError),

    /// The notifier could not be created, or the startup notification was
    /// not delivered.
    #[error("Startup notification failed: {0}")]
    StartupNotification(#[from] NotificationError),

    /// The scheduler refused its settings.
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

/// The primary runtime manager for the application.
pub struct Supervisor {
    /// Shared application configuration.
    config: Arc<AppConfig>,

    /// Already-notified identifiers per query.
    store: Arc<dyn IdentifierStore>,

    /// Runs the monitored queries.
    executor: Arc<dyn QueryExecutor>,

    /// Delivers notifications.
    notifier: Arc<dyn Notifier>,

    /// A token used to signal a graceful shutdown to all supervised tasks.
    cancellation_token: CancellationToken,

    /// Background tasks owned by the supervisor.
    join_set: JoinSet<()>,
}

impl Supervisor {
    /// Creates a new Supervisor instance with all its required components.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn IdentifierStore>,
        executor: Arc<dyn QueryExecutor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            executor,
            notifier,
            cancellation_token: CancellationToken::new(),
            join_set: JoinSet::new(),
        }
    }

    /// Returns a new `SupervisorBuilder` instance.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// The token that stops the supervisor when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Starts monitoring and blocks until shutdown.
    ///
    /// 1. Sends the startup notification to the base endpoint. Failure here
    ///    aborts startup.
    /// 2. Spawns a signal handler for `SIGINT` (Ctrl+C) and `SIGTERM`.
    /// 3. Runs the scheduler until the cancellation token fires. A query in
    ///    progress is allowed to finish.
    /// 4. Closes the database pool.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        self.notifier
            .send(&self.config.base_notification_url, STARTUP_MESSAGE)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Startup notification failed."))?;
        tracing::info!(endpoint = %self.config.base_notification_url, "Startup notification sent.");

        let cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut stream) => {
                        stream.recv().await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to register SIGTERM handler.");
                        std::future::pending::<()>().await;
                    }
                }
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown.")
                }
                _ = terminate => {
                    tracing::info!("SIGTERM received, initiating graceful shutdown.")
                }
                _ = cancellation_token.cancelled() => return,
            }

            cancellation_token.cancel();
        });

        let orchestrator = CycleOrchestrator::new(
            Arc::new(self.config.notification_settings()),
            Arc::new(self.config.queries.clone()),
            Arc::clone(&self.store),
            Arc::clone(&self.executor),
            Arc::clone(&self.notifier),
        );
        let scheduler = Scheduler::new(
            orchestrator,
            self.config.check_interval,
            self.cancellation_token.clone(),
        )?;

        tracing::info!(
            enabled = self.config.enabled_queries().count(),
            interval_secs = self.config.check_interval.as_secs(),
            "Monitoring started."
        );
        scheduler.run().await;

        // --- Graceful Shutdown ---
        self.cancellation_token.cancel();
        while let Some(result) = self.join_set.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "A supervised task failed during shutdown.");
            }
        }

        tracing::info!("Starting graceful resource cleanup...");
        self.executor.close().await;
        tracing::info!("Supervisor shutdown complete.");
        Ok(())
    }
}
