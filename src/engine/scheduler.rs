//! Drives monitoring cycles on a fixed interval until shutdown.

use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::cycle::CycleOrchestrator;
use crate::{notification::Notifier, persistence::traits::IdentifierStore, providers::QueryExecutor};

/// Errors raised when constructing a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The interval between cycles must be positive.
    #[error("Check interval must be greater than zero")]
    InvalidInterval,
}

/// Runs a cycle, sleeps for the interval, and repeats.
///
/// Cycles never overlap: the sleep starts once a cycle has finished, so a
/// slow cycle delays the next one rather than running beside it.
pub struct Scheduler<S: IdentifierStore + ?Sized, Q: QueryExecutor + ?Sized, N: Notifier + ?Sized>
{
    /// Evaluates the queries.
    orchestrator: CycleOrchestrator<S, Q, N>,
    /// Pause between the end of one cycle and the start of the next.
    interval: Duration,
    /// A token used to signal a graceful shutdown.
    cancellation_token: CancellationToken,
}

impl<S: IdentifierStore + ?Sized, Q: QueryExecutor + ?Sized, N: Notifier + ?Sized>
    Scheduler<S, Q, N>
{
    /// Creates a new Scheduler instance.
    pub fn new(
        orchestrator: CycleOrchestrator<S, Q, N>,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Result<Self, SchedulerError> {
        if interval.is_zero() {
            return Err(SchedulerError::InvalidInterval);
        }
        Ok(Self { orchestrator, interval, cancellation_token })
    }

    /// Runs cycles until the cancellation token fires. Returns the number of
    /// cycles started.
    pub async fn run(&self) -> u64 {
        tracing::info!(interval = ?self.interval, "Scheduler started.");
        let mut cycles = 0u64;

        loop {
            if self.cancellation_token.is_cancelled() {
                break;
            }

            cycles += 1;
            let report = self.orchestrator.run_cycle(&self.cancellation_token).await;
            tracing::info!(
                cycle = cycles,
                evaluated = report.specs.len(),
                notified = report.notified(),
                failed = report.failed(),
                "Monitoring cycle complete."
            );

            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Scheduler received shutdown signal.");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!(cycles, "Scheduler has shut down.");
        cycles
    }
}
