//! Job launch and resume entry points
//!
//! The launcher is what a command surface calls once it has resolved a job
//! definition: it obtains or re-opens the execution record, drives the
//! job, makes sure the final state is persisted and fans the result out to
//! notifiers.

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::execution::{JobExecution, JobInstance};
use crate::job::Job;
use crate::notification::Notifier;
use crate::repository::JobRepository;
use crate::{BatchError, Result};

/// Creates or resumes execution records and drives a job over them
#[derive(Default)]
pub struct JobLauncher {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl JobLauncher {
    /// Create a launcher with no notifiers
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a notifier; all attached notifiers receive every result
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Launch a fresh execution of `job` for the given job instance
    #[instrument(skip(self, job, job_instance), fields(job = %job.name(), code = job_instance.code()))]
    pub async fn launch(&self, job: &Job, job_instance: &JobInstance) -> Result<JobExecution> {
        let mut job_execution = job
            .job_repository()
            .create_job_execution(job_instance)
            .await?;
        job_execution.set_pid(std::process::id());
        self.run(job, job_execution).await
    }

    /// Resume a previously created execution by id
    ///
    /// Only an execution persisted in its starting state can be resumed;
    /// anything else is refused as a configuration error before any step
    /// runs and before any execution state is mutated.
    #[instrument(skip(self, job), fields(job = %job.name(), execution = execution_id))]
    pub async fn resume(&self, job: &Job, execution_id: i64) -> Result<JobExecution> {
        let mut job_execution = job
            .job_repository()
            .find_job_execution_by_id(execution_id)
            .await?
            .ok_or_else(|| {
                BatchError::Configuration(format!(
                    "could not find job execution \"{execution_id}\""
                ))
            })?;

        if !job_execution.is_resumable() {
            return Err(BatchError::Configuration(format!(
                "job execution \"{execution_id}\" has invalid status: {}",
                job_execution.status()
            )));
        }

        job_execution.set_pid(std::process::id());
        self.run(job, job_execution).await
    }

    async fn run(&self, job: &Job, mut job_execution: JobExecution) -> Result<JobExecution> {
        job.execute(&mut job_execution).await?;
        job.job_repository()
            .update_job_execution(&mut job_execution)
            .await?;

        for notifier in &self.notifiers {
            if let Err(error) = notifier.notify(&job_execution).await {
                // A lost notification must never fail the job
                warn!(error = %error, "notifier failed, result not delivered");
            }
        }

        Ok(job_execution)
    }
}

impl std::fmt::Debug for JobLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobLauncher")
            .field("notifiers", &self.notifiers.len())
            .finish()
    }
}
