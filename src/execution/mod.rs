//! Execution record entities
//!
//! The entity graph is single-rooted: a [`JobExecution`] owns its ordered
//! [`StepExecution`]s, each of which owns its warnings, failures, counters
//! and context. Everything needed for a human-facing report is derivable
//! from a `JobExecution` alone.

pub mod failure;
pub mod instance;
pub mod job;
pub mod step;
pub mod warning;

pub use failure::{FailureException, Fault};
pub use instance::JobInstance;
pub use job::JobExecution;
pub use step::StepExecution;
pub use warning::{Warning, WarningItem};
