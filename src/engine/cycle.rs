//! The monitoring cycle: query, diff against seen identifiers, notify,
//! persist.
//!
//! Each enabled query is evaluated in configuration order. For one query the
//! steps are strictly ordered:
//!
//! 1. load the identifiers already notified for the query name,
//! 2. run the query,
//! 3. keep the identifiers not seen before,
//! 4. if any, send one notification with their count,
//! 5. only after a successful delivery, save `seen ∪ new`.
//!
//! A failure in any step is confined to the query that produced it. A failed
//! delivery leaves the stored set untouched so the same rows are reported
//! again next cycle.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    models::{IdentifierSet, NotificationSettings, QuerySpec, RowId},
    notification::{NotificationError, Notifier, compose_message, resolve_endpoint},
    persistence::{error::PersistenceError, traits::IdentifierStore},
    providers::{QueryError, QueryExecutor},
};

/// Why the evaluation of a single query did not complete.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The stored identifiers could not be read; the query was not run.
    #[error("Failed to load seen identifiers: {0}")]
    Load(#[source] PersistenceError),

    /// The query itself failed; nothing was stored.
    #[error("Query failed: {0}")]
    Query(#[from] QueryError),

    /// The notification was not delivered; the new identifiers were not
    /// stored and will be reported again.
    #[error("Notification failed: {0}")]
    Delivery(#[from] NotificationError),

    /// The notification went out but the identifiers could not be stored;
    /// they may be reported again.
    #[error("Failed to persist seen identifiers after delivery: {0}")]
    Store(#[source] PersistenceError),
}

/// Result of evaluating one query in a cycle.
#[derive(Debug)]
pub enum SpecOutcome {
    /// Every identifier returned was already known.
    NoNewRows,
    /// A notification was delivered and the identifiers stored.
    Notified {
        /// Number of new identifiers reported.
        new: usize,
    },
    /// The evaluation stopped early.
    Failed(SpecError),
}

/// Outcome of one query, tagged with its name.
#[derive(Debug)]
pub struct SpecReport {
    /// The query name.
    pub name: String,
    /// What happened.
    pub outcome: SpecOutcome,
}

/// Summary of one pass over the enabled queries.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// One entry per evaluated query, in evaluation order.
    pub specs: Vec<SpecReport>,
    /// Set when cancellation stopped the cycle before every query ran.
    pub cancelled: bool,
}

impl CycleReport {
    /// Number of queries that produced a notification.
    pub fn notified(&self) -> usize {
        self.specs.iter().filter(|s| matches!(s.outcome, SpecOutcome::Notified { .. })).count()
    }

    /// Number of queries whose evaluation failed.
    pub fn failed(&self) -> usize {
        self.specs.iter().filter(|s| matches!(s.outcome, SpecOutcome::Failed(_))).count()
    }

    /// The outcome recorded for `name`, if it was evaluated.
    pub fn outcome(&self, name: &str) -> Option<&SpecOutcome> {
        self.specs.iter().find(|s| s.name == name).map(|s| &s.outcome)
    }
}

/// Identifiers in `found` that are not in `seen`.
pub fn new_identifiers(
    found: impl IntoIterator<Item = RowId>,
    seen: &IdentifierSet,
) -> IdentifierSet {
    found.into_iter().filter(|id| !seen.contains(id)).collect()
}

/// Runs monitoring cycles over a fixed list of queries.
pub struct CycleOrchestrator<
    S: IdentifierStore + ?Sized,
    Q: QueryExecutor + ?Sized,
    N: Notifier + ?Sized,
> {
    /// Endpoint, template and interval shared by all queries.
    settings: Arc<NotificationSettings>,
    /// The configured queries, in evaluation order.
    specs: Arc<Vec<QuerySpec>>,
    /// Already-notified identifiers per query name.
    store: Arc<S>,
    /// Runs the queries.
    executor: Arc<Q>,
    /// Delivers notifications.
    notifier: Arc<N>,
}

impl<S: IdentifierStore + ?Sized, Q: QueryExecutor + ?Sized, N: Notifier + ?Sized>
    CycleOrchestrator<S, Q, N>
{
    /// Creates a new CycleOrchestrator instance.
    pub fn new(
        settings: Arc<NotificationSettings>,
        specs: Arc<Vec<QuerySpec>>,
        store: Arc<S>,
        executor: Arc<Q>,
        notifier: Arc<N>,
    ) -> Self {
        Self { settings, specs, store, executor, notifier }
    }

    /// Evaluates every enabled query once.
    ///
    /// Cancellation is checked before each query; a query already in
    /// progress always runs to completion.
    pub async fn run_cycle(&self, cancellation_token: &CancellationToken) -> CycleReport {
        let mut report = CycleReport::default();

        for spec in self.specs.iter().filter(|spec| spec.enabled) {
            if cancellation_token.is_cancelled() {
                tracing::info!("Cancellation requested, stopping cycle early.");
                report.cancelled = true;
                break;
            }

            let outcome = match self.evaluate(spec).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    match &e {
                        SpecError::Store(_) => tracing::warn!(
                            query = %spec.name,
                            error = %e,
                            "Notification sent but state not saved; rows may be reported again."
                        ),
                        _ => tracing::error!(
                            query = %spec.name,
                            error = %e,
                            "Error during monitoring, skipping query for this cycle."
                        ),
                    }
                    SpecOutcome::Failed(e)
                }
            };
            report.specs.push(SpecReport { name: spec.name.clone(), outcome });
        }

        report
    }

    /// Evaluates a single query: load, run, diff, notify, save.
    #[tracing::instrument(skip(self, spec), fields(query = %spec.name), level = "debug")]
    pub async fn evaluate(&self, spec: &QuerySpec) -> Result<SpecOutcome, SpecError> {
        let seen = self.store.load(&spec.name).await.map_err(SpecError::Load)?;
        let found = self.executor.run(&spec.query).await?;
        let new = new_identifiers(found, &seen);

        if new.is_empty() {
            tracing::debug!(seen = seen.len(), "No new rows.");
            return Ok(SpecOutcome::NoNewRows);
        }

        let endpoint = resolve_endpoint(&self.settings, spec);
        let message = compose_message(&self.settings, spec, new.len());
        self.notifier.send(endpoint, &message).await?;
        tracing::info!(endpoint, message = %message, "Notification sent.");

        let count = new.len();
        let mut updated = seen;
        updated.extend(new);
        self.store.save(&spec.name, &updated).await.map_err(SpecError::Store)?;

        Ok(SpecOutcome::Notified { new: count })
    }
}
