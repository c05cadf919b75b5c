//! # Batchline
//!
//! A batch-job execution engine: given a named job definition, run its steps
//! in order, track progress, aggregate warnings and failures, and produce a
//! durable execution record with a final status.
//!
//! ## Overview
//!
//! Batchline is the execution-accounting core of an import/export pipeline.
//! It owns the job/step state machine (`BatchStatus` / `ExitStatus`), the
//! [`JobExecution`](execution::JobExecution) /
//! [`StepExecution`](execution::StepExecution) entity graph, failure and
//! warning capture, and the aggregation of per-step outcomes into a final
//! job result. Storage backends, item readers/writers and command surfaces
//! plug in at trait seams ([`repository::JobRepository`], [`job::Step`],
//! [`notification::Notifier`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use batchline::execution::{JobInstance, StepExecution};
//! use batchline::job::{Job, Step, StepError};
//! use batchline::launcher::JobLauncher;
//! use batchline::repository::InMemoryJobRepository;
//! use async_trait::async_trait;
//!
//! struct CopyStep;
//!
//! #[async_trait]
//! impl Step for CopyStep {
//!     fn name(&self) -> &str {
//!         "copy"
//!     }
//!
//!     async fn execute(&self, step_execution: &mut StepExecution) -> Result<(), StepError> {
//!         step_execution.increment_read_count();
//!         step_execution.increment_write_count();
//!         step_execution.increment_summary_info_by_one("create");
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> batchline::Result<()> {
//! let repository = Arc::new(InMemoryJobRepository::new());
//! let job = Job::new("product_import", repository).with_step(CopyStep);
//!
//! let instance = JobInstance::new("acme_product_import", "import");
//! let execution = JobLauncher::new().launch(&job, &instance).await?;
//!
//! assert!(!execution.status().is_unsuccessful());
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Guarantees
//!
//! - **Monotonic statuses**: lifecycle state only ever moves forward in
//!   severity through the upgrade operation; a late, less-informed update
//!   can never hide a failure.
//! - **Lossless accounting**: failures and warnings are append-only and
//!   survive in the execution record no matter when the job aborts.
//! - **Durable records**: the execution record is persisted after every
//!   step, so an interrupted run leaves a consistent, queryable trail.
//! - **Resumability**: an execution persisted in its starting state can be
//!   picked up again by id; anything else is refused before any step runs.
//!
//! ## Modules
//!
//! - [`status`]: `BatchStatus` and `ExitStatus` state machines
//! - [`context`]: key/value execution context for resumable step state
//! - [`execution`]: the `JobExecution` / `StepExecution` entity graph
//! - [`job`]: the job driver and the `Step` unit-of-work seam
//! - [`repository`]: persistence contract and in-memory backend
//! - [`launcher`]: create-or-resume entry points
//! - [`notification`]: fire-and-forget result sinks
//! - [`report`]: human-facing execution reports

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use thiserror::Error;

/// Result type for batchline operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// Main error type for batchline operations
///
/// Step-level faults never surface here: they are captured on the failing
/// [`StepExecution`](execution::StepExecution) and execution continues per
/// job policy. This type carries only the errors the caller must act on.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Bad job code, bad execution id or an invalid resume attempt;
    /// raised before any execution state is mutated
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed job or step configuration, raised before execution begins
    #[error("Validation error: {0}")]
    Validation(String),

    /// The execution record could not be persisted; fatal, since losing
    /// the record is worse than losing step throughput
    #[error("Repository error: {0}")]
    Repository(#[from] repository::RepositoryError),
}

/// Lifecycle and exit status state machines
pub mod status;

/// Execution context key/value bag
pub mod context;

/// Execution record entities
pub mod execution;

/// Job driver and step abstraction
pub mod job;

/// Persistence contract for execution records
pub mod repository;

/// Job launch and resume entry points
pub mod launcher;

/// Result notification sinks
pub mod notification;

/// Human-facing execution reports
pub mod report;
