//! Job execution records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::ExecutionContext;
use crate::execution::failure::{FailureException, Fault};
use crate::execution::instance::JobInstance;
use crate::execution::step::StepExecution;
use crate::status::{BatchStatus, ExitStatus};
use crate::{BatchError, Result};

/// One concrete run of a job
///
/// Owns the ordered step executions (insertion order is execution order)
/// and the job-level failure list. Created in `Starting` status with no
/// end time; logically closed once the end time is set and the status
/// reaches a terminal value. Only an execution still in `Starting` status
/// is eligible to be resumed by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobExecution {
    id: Option<i64>,
    job_instance: Option<JobInstance>,
    status: BatchStatus,
    exit_status: ExitStatus,
    execution_context: ExecutionContext,
    create_time: DateTime<Utc>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    updated_time: Option<DateTime<Utc>>,
    step_executions: Vec<StepExecution>,
    failure_exceptions: Vec<FailureException>,
    pid: Option<u32>,
}

impl JobExecution {
    /// Create an execution record not attached to any job instance
    ///
    /// Useful for tests and ad-hoc runs; production runs come from
    /// [`for_instance`](Self::for_instance) via the repository.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: None,
            job_instance: None,
            status: BatchStatus::Starting,
            exit_status: ExitStatus::executing(),
            execution_context: ExecutionContext::new(),
            create_time: now,
            start_time: now,
            end_time: None,
            updated_time: None,
            step_executions: Vec::new(),
            failure_exceptions: Vec::new(),
            pid: None,
        }
    }

    /// Create an execution record for a job instance
    pub fn for_instance(job_instance: JobInstance) -> Self {
        let mut execution = Self::new();
        execution.job_instance = Some(job_instance);
        execution
    }

    /// Assigned id, absent until persisted
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    /// The job definition this execution runs, when attached
    pub fn job_instance(&self) -> Option<&JobInstance> {
        self.job_instance.as_ref()
    }

    /// Current lifecycle status
    pub fn status(&self) -> BatchStatus {
        self.status
    }

    /// Set the status directly
    ///
    /// Administrative override: this can move the status backwards, e.g.
    /// to mark a crashed run `Abandoned`. Normal execution must go through
    /// [`upgrade_status`](Self::upgrade_status).
    pub fn set_status(&mut self, status: BatchStatus) -> &mut Self {
        self.status = status;
        self
    }

    /// Upgrade the status, keeping the more severe of current and candidate
    pub fn upgrade_status(&mut self, candidate: BatchStatus) -> &mut Self {
        self.status = self.status.upgrade(candidate);
        self
    }

    /// Current exit status
    pub fn exit_status(&self) -> &ExitStatus {
        &self.exit_status
    }

    /// Replace the exit status
    pub fn set_exit_status(&mut self, exit_status: ExitStatus) -> &mut Self {
        self.exit_status = exit_status;
        self
    }

    /// The job-level execution context
    pub fn execution_context(&self) -> &ExecutionContext {
        &self.execution_context
    }

    /// Mutable access to the job-level execution context
    pub fn execution_context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.execution_context
    }

    /// When this record was created
    pub fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }

    /// When this run started
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Refresh the start time, e.g. when a resumed execution begins
    pub fn set_start_time(&mut self, start_time: DateTime<Utc>) -> &mut Self {
        self.start_time = start_time;
        self
    }

    /// When this run finished, absent while it is still open
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Close the record by setting the end time
    pub fn set_end_time(&mut self, end_time: DateTime<Utc>) -> &mut Self {
        self.end_time = Some(end_time);
        self
    }

    /// When this record was last persisted
    pub fn updated_time(&self) -> Option<DateTime<Utc>> {
        self.updated_time
    }

    /// Stamp the record as just updated
    pub fn mark_updated(&mut self) -> &mut Self {
        self.updated_time = Some(Utc::now());
        self
    }

    /// Process id of the runner driving this execution
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Record the runner's process id
    pub fn set_pid(&mut self, pid: u32) -> &mut Self {
        self.pid = Some(pid);
        self
    }

    /// Append a new step execution and return it
    ///
    /// The only way steps attach to a job execution. Step names are lookup
    /// keys, so a duplicate name is a caller error, never a silent merge.
    pub fn create_step_execution(&mut self, step_name: &str) -> Result<&mut StepExecution> {
        if self.step_executions.iter().any(|step| step.step_name() == step_name) {
            return Err(BatchError::Configuration(format!(
                "step execution \"{step_name}\" already exists in this job execution"
            )));
        }
        self.step_executions.push(StepExecution::new(step_name));
        Ok(self
            .step_executions
            .last_mut()
            .expect("step execution was just pushed"))
    }

    /// Step executions in execution order
    pub fn step_executions(&self) -> &[StepExecution] {
        &self.step_executions
    }

    /// Mutable access to the step executions
    pub fn step_executions_mut(&mut self) -> &mut [StepExecution] {
        &mut self.step_executions
    }

    /// Look up a step execution by step name
    pub fn step_execution(&self, step_name: &str) -> Option<&StepExecution> {
        self.step_executions
            .iter()
            .find(|step| step.step_name() == step_name)
    }

    /// Look up a step execution by step name, mutably
    pub fn step_execution_mut(&mut self, step_name: &str) -> Option<&mut StepExecution> {
        self.step_executions
            .iter_mut()
            .find(|step| step.step_name() == step_name)
    }

    /// Capture a job-level fault, in observation order
    pub fn add_failure_exception<F: Fault>(&mut self, fault: &F) -> &mut Self {
        self.failure_exceptions.push(FailureException::capture(fault));
        self
    }

    /// Job-level faults only; step-level faults live on their step
    pub fn failure_exceptions(&self) -> &[FailureException] {
        &self.failure_exceptions
    }

    /// Whether this execution is still in flight
    pub fn is_running(&self) -> bool {
        self.status.is_running() && self.end_time.is_none()
    }

    /// Whether a stop request is being honored
    pub fn is_stopping(&self) -> bool {
        self.status.is_stopping()
    }

    /// Whether this execution can be picked up again by id
    pub fn is_resumable(&self) -> bool {
        self.status.is_starting()
    }

    /// Request a cooperative stop of the whole execution
    ///
    /// Flags every step terminate-only and moves the job to `Stopping`;
    /// steps that never check the flag never stop.
    pub fn stop(&mut self) -> &mut Self {
        for step_execution in &mut self.step_executions {
            step_execution.set_terminate_only();
        }
        self.status = self.status.upgrade(BatchStatus::Stopping);
        self
    }
}

impl Default for JobExecution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobExecution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self
            .job_instance
            .as_ref()
            .map(JobInstance::code)
            .unwrap_or("?");
        write!(
            f,
            "id={}, job=[{}], status=[{}], exitCode=[{}]",
            self.id.unwrap_or(0),
            code,
            self.status,
            self.exit_status.exit_code()
        )
    }
}
