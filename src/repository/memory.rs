use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::execution::{JobExecution, JobInstance};
use crate::repository::{JobRepository, RepositoryError};

/// In-memory job repository
///
/// Stores deep copies of the execution records, so a caller's later
/// mutations don't leak into the store until the next update. Intended for
/// tests and single-process runs.
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    executions: DashMap<i64, JobExecution>,
    sequence: AtomicI64,
}

impl InMemoryJobRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored execution records
    pub fn len(&self) -> usize {
        self.executions.len()
    }

    /// Whether the repository holds no records
    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }

    fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn assign_ids(&self, job_execution: &mut JobExecution) {
        if job_execution.id().is_none() {
            job_execution.set_id(self.next_id());
        }
        for step_execution in job_execution.step_executions_mut() {
            if step_execution.id().is_none() {
                let id = self.next_id();
                step_execution.set_id(id);
            }
        }
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create_job_execution(
        &self,
        job_instance: &JobInstance,
    ) -> Result<JobExecution, RepositoryError> {
        let mut job_execution = JobExecution::for_instance(job_instance.clone());
        self.assign_ids(&mut job_execution);
        job_execution.mark_updated();
        let id = job_execution
            .id()
            .ok_or_else(|| RepositoryError::SaveFailed("id assignment failed".to_string()))?;
        self.executions.insert(id, job_execution.clone());
        Ok(job_execution)
    }

    async fn update_job_execution(
        &self,
        job_execution: &mut JobExecution,
    ) -> Result<(), RepositoryError> {
        self.assign_ids(job_execution);
        job_execution.mark_updated();
        let id = job_execution
            .id()
            .ok_or_else(|| RepositoryError::SaveFailed("id assignment failed".to_string()))?;
        self.executions.insert(id, job_execution.clone());
        Ok(())
    }

    async fn find_job_execution_by_id(
        &self,
        id: i64,
    ) -> Result<Option<JobExecution>, RepositoryError> {
        Ok(self.executions.get(&id).map(|entry| entry.value().clone()))
    }
}
