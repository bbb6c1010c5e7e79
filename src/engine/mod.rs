//! The monitoring engine: per-query cycle evaluation and the interval loop
//! that drives it.

pub mod cycle;
pub mod scheduler;

pub use cycle::{
    CycleOrchestrator, CycleReport, SpecError, SpecOutcome, SpecReport, new_identifiers,
};
pub use scheduler::{Scheduler, SchedulerError};
