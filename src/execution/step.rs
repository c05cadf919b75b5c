//! Step execution records

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::context::ExecutionContext;
use crate::execution::failure::{FailureException, Fault};
use crate::execution::warning::{Warning, WarningItem};
use crate::status::{BatchStatus, ExitStatus};

/// One step's run record within a job execution
///
/// Created only through
/// [`JobExecution::create_step_execution`](super::JobExecution::create_step_execution);
/// the owning job execution holds it for its whole life. The numeric id is
/// absent until the record is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepExecution {
    id: Option<i64>,
    step_name: String,
    status: BatchStatus,
    exit_status: ExitStatus,
    execution_context: ExecutionContext,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    read_count: u64,
    write_count: u64,
    terminate_only: bool,
    failure_exceptions: Vec<FailureException>,
    warnings: Vec<Warning>,
    summary: DashMap<String, u64>,
}

impl StepExecution {
    pub(crate) fn new(step_name: impl Into<String>) -> Self {
        Self {
            id: None,
            step_name: step_name.into(),
            status: BatchStatus::Starting,
            exit_status: ExitStatus::executing(),
            execution_context: ExecutionContext::new(),
            start_time: Utc::now(),
            end_time: None,
            read_count: 0,
            write_count: 0,
            terminate_only: false,
            failure_exceptions: Vec::new(),
            warnings: Vec::new(),
            summary: DashMap::new(),
        }
    }

    /// Assigned id, absent until persisted
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    /// Name of the step this record belongs to, unique within the job
    pub fn step_name(&self) -> &str {
        &self.step_name
    }

    /// Current lifecycle status
    pub fn status(&self) -> BatchStatus {
        self.status
    }

    /// Set the status directly
    ///
    /// Administrative override: this can move the status backwards. Normal
    /// execution must go through [`upgrade_status`](Self::upgrade_status).
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

    /// The step-local execution context
    pub fn execution_context(&self) -> &ExecutionContext {
        &self.execution_context
    }

    /// Mutable access to the step-local execution context
    pub fn execution_context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.execution_context
    }

    /// Replace the execution context
    pub fn set_execution_context(&mut self, execution_context: ExecutionContext) -> &mut Self {
        self.execution_context = execution_context;
        self
    }

    /// When this step started
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Override the start time
    pub fn set_start_time(&mut self, start_time: DateTime<Utc>) -> &mut Self {
        self.start_time = start_time;
        self
    }

    /// When this step finished, absent while it is still running
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Set the end time
    pub fn set_end_time(&mut self, end_time: DateTime<Utc>) -> &mut Self {
        self.end_time = Some(end_time);
        self
    }

    /// Number of items read
    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    /// Set the read count
    pub fn set_read_count(&mut self, read_count: u64) -> &mut Self {
        self.read_count = read_count;
        self
    }

    /// Add one to the read count
    pub fn increment_read_count(&mut self) -> &mut Self {
        self.read_count += 1;
        self
    }

    /// Number of items written
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// Set the write count
    pub fn set_write_count(&mut self, write_count: u64) -> &mut Self {
        self.write_count = write_count;
        self
    }

    /// Add one to the write count
    pub fn increment_write_count(&mut self) -> &mut Self {
        self.write_count += 1;
        self
    }

    /// Items read but not written, i.e. filtered out
    pub fn filter_count(&self) -> u64 {
        self.read_count.saturating_sub(self.write_count)
    }

    /// Whether a cooperative stop was requested
    pub fn is_terminate_only(&self) -> bool {
        self.terminate_only
    }

    /// Request a cooperative stop
    ///
    /// One-way: there is no way to clear the flag. The step's unit of work
    /// must check it between units of work and stop promptly; the step is
    /// then treated as stopped rather than failed.
    pub fn set_terminate_only(&mut self) -> &mut Self {
        self.terminate_only = true;
        self
    }

    /// Capture a fault on this step, in observation order
    pub fn add_failure_exception<F: Fault>(&mut self, fault: &F) -> &mut Self {
        self.failure_exceptions.push(FailureException::capture(fault));
        self
    }

    /// Faults captured on this step, in observation order
    pub fn failure_exceptions(&self) -> &[FailureException] {
        &self.failure_exceptions
    }

    /// Record a warning about the item currently being processed
    ///
    /// The stored warning name is templated as
    /// `{element}.steps.{name}.title` where `element` is the step name
    /// truncated at its first `.`. Item capture is best-effort and never
    /// fails the step.
    pub fn add_warning<T: Serialize + ?Sized>(
        &mut self,
        name: &str,
        reason: &str,
        reason_parameters: HashMap<String, String>,
        item: &T,
    ) -> &mut Self {
        let element = self
            .step_name
            .split('.')
            .next()
            .unwrap_or(self.step_name.as_str());
        self.warnings.push(Warning::new(
            format!("{element}.steps.{name}.title"),
            reason,
            reason_parameters,
            WarningItem::capture(item),
        ));
        self
    }

    /// Warnings recorded on this step, in observation order
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Add `amount` to the named summary counter, creating it at zero
    ///
    /// Safe to call concurrently for the same name without lost updates,
    /// for steps whose unit of work is internally parallel.
    pub fn increment_summary_info(&self, name: &str, amount: u64) {
        *self.summary.entry(name.to_string()).or_insert(0) += amount;
    }

    /// Add one to the named summary counter
    pub fn increment_summary_info_by_one(&self, name: &str) {
        self.increment_summary_info(name, 1);
    }

    /// Value of the named summary counter; zero for an unknown name
    pub fn get_summary_info(&self, name: &str) -> u64 {
        self.summary.get(name).map(|entry| *entry).unwrap_or(0)
    }

    /// All summary counters, sorted by name for stable rendering
    pub fn summary(&self) -> std::collections::BTreeMap<String, u64> {
        self.summary
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

impl std::fmt::Display for StepExecution {
    /// Fixed format for log correlation; the token order is a
    /// compatibility contract for operator tooling
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "id={}, name=[{}], status=[{}], exitCode=[{}], exitDescription=[{}]",
            self.id.unwrap_or(0),
            self.step_name,
            self.status.value(),
            self.exit_status.exit_code(),
            self.exit_status.exit_description()
        )
    }
}
