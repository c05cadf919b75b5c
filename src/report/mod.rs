//! Human-facing execution reports
//!
//! Everything rendered here is derived purely from a
//! [`JobExecution`](crate::execution::JobExecution)'s fields, so a report
//! can be produced from a freshly loaded record as well as from a live
//! run.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::execution::{FailureException, JobExecution};
use crate::status::ExitCode;

/// Replace `%placeholder%` tokens in `message` with their substitutions
///
/// Tokens without a substitution are left in place, so a report never
/// hides part of a message.
pub fn interpolate(message: &str, parameters: &HashMap<String, String>) -> String {
    let mut interpolated = message.to_string();
    for (token, value) in parameters {
        interpolated = interpolated.replace(token, value);
    }
    interpolated
}

/// All failures of an execution in report order: job-level first, then
/// each step's failures in execution order
pub fn collect_failures(job_execution: &JobExecution) -> Vec<&FailureException> {
    let mut failures: Vec<&FailureException> = job_execution.failure_exceptions().iter().collect();
    for step_execution in job_execution.step_executions() {
        failures.extend(step_execution.failure_exceptions().iter());
    }
    failures
}

/// Renderable report over a finished job execution
#[derive(Debug, Clone, Copy)]
pub struct ExecutionReport<'a> {
    job_execution: &'a JobExecution,
    verbose: bool,
}

impl<'a> ExecutionReport<'a> {
    /// Build a report for an execution
    pub fn new(job_execution: &'a JobExecution) -> Self {
        Self {
            job_execution,
            verbose: false,
        }
    }

    /// Additionally render each failure's stack trace text
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn job_type(&self) -> &str {
        self.job_execution
            .job_instance()
            .map(|instance| instance.job_type())
            .unwrap_or("job")
    }

    fn job_code(&self) -> &str {
        self.job_execution
            .job_instance()
            .map(|instance| instance.code())
            .unwrap_or("?")
    }
}

impl std::fmt::Display for ExecutionReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let execution = self.job_execution;
        let exit_status = execution.exit_status();

        if exit_status.exit_code() == ExitCode::Completed {
            let mut job_type = self.job_type().to_string();
            if let Some(first) = job_type.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            writeln!(
                f,
                "{} {} has been successfully executed.",
                job_type,
                self.job_code()
            )?;
        } else {
            writeln!(
                f,
                "An error occurred during the {} execution.",
                self.job_type()
            )?;
            writeln!(
                f,
                "Status: {}, exit code: {}, exit description: [{}]",
                execution.status(),
                exit_status.exit_code(),
                exit_status.exit_description()
            )?;
            for failure in collect_failures(execution) {
                writeln!(
                    f,
                    "Error #{} in class {}: {}",
                    failure.code(),
                    failure.class(),
                    interpolate(failure.message(), failure.message_parameters())
                )?;
                if self.verbose {
                    writeln!(f, "{}", failure.trace())?;
                }
            }
        }

        for step_execution in execution.step_executions() {
            let mut line = format!(
                "{}: read {}, written {}, filtered {}",
                step_execution.step_name(),
                step_execution.read_count(),
                step_execution.write_count(),
                step_execution.filter_count()
            );
            for (name, count) in step_execution.summary() {
                let _ = write!(line, ", {name} {count}");
            }
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}
