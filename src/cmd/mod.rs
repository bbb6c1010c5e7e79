//! Subcommands of the `sqlal` binary other than the monitoring loop itself.

#![allow(missing_docs)]

pub mod dry_run;
