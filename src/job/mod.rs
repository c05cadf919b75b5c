//! Job driver and step abstraction
//!
//! The [`Job`] drives one [`JobExecution`](crate::execution::JobExecution)
//! through its steps in declared order, one at a time. Faults raised by a
//! step are captured on its step execution and never escape the driver;
//! only configuration and persistence errors reach the caller.

pub mod step;

pub use step::{Step, StepError};

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use crate::execution::JobExecution;
use crate::repository::JobRepository;
use crate::status::{BatchStatus, ExitCode, ExitStatus};
use crate::BatchError;

/// A named, repeatable unit of work composed of an ordered sequence of steps
pub struct Job {
    name: String,
    steps: Vec<Box<dyn Step>>,
    job_repository: Arc<dyn JobRepository>,
}

impl Job {
    /// Create a job with no steps
    pub fn new(name: impl Into<String>, job_repository: Arc<dyn JobRepository>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            job_repository,
        }
    }

    /// Append a step; steps run in the order they were added
    pub fn with_step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Job name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the declared steps, in execution order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// The repository this job persists execution records through
    pub fn job_repository(&self) -> &Arc<dyn JobRepository> {
        &self.job_repository
    }

    /// Drive the job execution through every step
    ///
    /// The execution record is persisted after each step, so an
    /// interruption leaves a consistent, queryable trail. Step faults are
    /// captured on their step execution; a repository fault aborts the run
    /// and reaches the caller, since losing the record is worse than
    /// losing step throughput.
    #[instrument(skip(self, job_execution), fields(job = %self.name))]
    pub async fn execute(&self, job_execution: &mut JobExecution) -> Result<(), BatchError> {
        info!(steps = self.steps.len(), "starting job execution");

        job_execution.set_start_time(Utc::now());
        job_execution.upgrade_status(BatchStatus::Started);
        self.job_repository.update_job_execution(job_execution).await?;

        let mut stopped_at_boundary = false;
        for step in &self.steps {
            // Step boundaries are the cooperative suspension points for a
            // whole-job stop request.
            if job_execution.is_stopping() {
                info!(step = step.name(), "stop requested, halting before step");
                stopped_at_boundary = true;
                break;
            }

            let step_status = self.handle_step(step.as_ref(), job_execution).await?;
            self.job_repository.update_job_execution(job_execution).await?;

            if step_status == BatchStatus::Failed && step.is_blocker() {
                warn!(step = step.name(), "blocking step failed, halting job");
                break;
            }
        }

        let mut aggregate_exit = job_execution
            .step_executions()
            .iter()
            .map(|step_execution| step_execution.exit_status().clone())
            .fold(ExitStatus::completed(), |total, step_exit| {
                total.and(&step_exit)
            });

        if stopped_at_boundary {
            job_execution.upgrade_status(BatchStatus::Stopped);
            aggregate_exit = aggregate_exit.and(&ExitStatus::stopped());
        } else {
            let aggregate_status = match job_execution.step_executions() {
                [] => BatchStatus::Completed,
                executed => executed
                    .iter()
                    .map(|step_execution| step_execution.status())
                    .fold(BatchStatus::Starting, BatchStatus::upgrade),
            };
            job_execution.upgrade_status(aggregate_status);
        }
        job_execution.set_exit_status(aggregate_exit);
        job_execution.set_end_time(Utc::now());
        self.job_repository.update_job_execution(job_execution).await?;

        info!(
            status = %job_execution.status(),
            exit_code = %job_execution.exit_status().exit_code(),
            "job execution finished"
        );
        Ok(())
    }

    /// Run one step's unit of work and settle its statuses
    ///
    /// Returns the step's final lifecycle status. Only configuration
    /// errors (duplicate step name) escape; step faults are captured on
    /// the step execution record.
    async fn handle_step(
        &self,
        step: &dyn Step,
        job_execution: &mut JobExecution,
    ) -> Result<BatchStatus, BatchError> {
        debug!(step = step.name(), "starting step");

        // Reuse the record when a resumed execution already carries one
        let step_execution = if job_execution.step_execution(step.name()).is_some() {
            job_execution
                .step_execution_mut(step.name())
                .expect("step execution exists")
        } else {
            job_execution.create_step_execution(step.name())?
        };
        step_execution.upgrade_status(BatchStatus::Started);

        let outcome = step.execute(step_execution).await;

        let (status, exit_status) = match outcome {
            Ok(()) if step_execution.is_terminate_only() => {
                info!(step = step.name(), "step observed stop request");
                (BatchStatus::Stopped, ExitStatus::stopped())
            }
            Ok(()) => {
                let current = step_execution.exit_status().clone();
                let exit = if current.exit_code() == ExitCode::Executing {
                    ExitStatus::with_description(
                        ExitCode::Completed,
                        current.exit_description(),
                    )
                } else {
                    // The unit of work settled its own exit status
                    current
                };
                (BatchStatus::Completed, exit)
            }
            Err(StepError::Interrupted) => {
                warn!(step = step.name(), "step interrupted");
                step_execution.add_failure_exception(&StepError::Interrupted);
                let mut exit = ExitStatus::stopped();
                exit.add_exit_description(&StepError::Interrupted.to_string());
                (BatchStatus::Stopped, exit)
            }
            Err(fault) => {
                error!(step = step.name(), error = %fault, "step failed");
                step_execution.add_failure_exception(&fault);
                let mut exit = ExitStatus::failed();
                exit.add_exit_description(&fault.to_string());
                (BatchStatus::Failed, exit)
            }
        };

        step_execution.upgrade_status(status);
        step_execution.set_exit_status(exit_status);
        step_execution.set_end_time(Utc::now());
        debug!(step = step.name(), status = %status, "step finished");

        if status == BatchStatus::Stopped {
            job_execution.upgrade_status(BatchStatus::Stopped);
        }

        Ok(status)
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .finish()
    }
}
