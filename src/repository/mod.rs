//! Persistence contract for execution records
//!
//! The core calls this interface and owns nothing behind it. Backends must
//! make [`update_job_execution`](JobRepository::update_job_execution) an
//! idempotent upsert by id, and are responsible for mutual exclusion
//! between two attempts to run the same job instance concurrently (e.g.
//! via a uniqueness constraint at persistence time).

mod memory;

pub use memory::InMemoryJobRepository;

use async_trait::async_trait;
use thiserror::Error;

use crate::execution::{JobExecution, JobInstance};

/// Errors raised by a job repository backend
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// No execution record exists under the given id
    #[error("job execution not found: {0}")]
    NotFound(i64),

    /// The execution record could not be persisted
    #[error("failed to persist job execution: {0}")]
    SaveFailed(String),

    /// The storage backend itself failed
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Storage contract for job execution records
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Create and persist a fresh execution record for a job instance
    ///
    /// The returned record has an assigned id and `Starting` status.
    async fn create_job_execution(
        &self,
        job_instance: &JobInstance,
    ) -> Result<JobExecution, RepositoryError>;

    /// Persist the current state of an execution record
    ///
    /// Idempotent upsert by id: safe to call repeatedly without
    /// corrupting state. Assigns ids to the record and any step
    /// executions that do not have one yet, and refreshes the record's
    /// updated time.
    async fn update_job_execution(
        &self,
        job_execution: &mut JobExecution,
    ) -> Result<(), RepositoryError>;

    /// Fetch an execution record by id
    async fn find_job_execution_by_id(
        &self,
        id: i64,
    ) -> Result<Option<JobExecution>, RepositoryError>;
}
