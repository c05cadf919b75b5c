//! Result notification sinks
//!
//! Sinks receive the final execution record for out-of-band delivery
//! (mail, chat, a dashboard). Delivery is fire-and-forget: a sink failure
//! is logged by the launcher and never fails the job.

use async_trait::async_trait;
use tracing::{error, info};

use crate::execution::JobExecution;
use crate::status::ExitCode;

/// A sink for finished job executions
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the final execution record
    async fn notify(&self, job_execution: &JobExecution) -> anyhow::Result<()>;
}

/// Notifier that writes a one-line outcome to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Create a log notifier
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, job_execution: &JobExecution) -> anyhow::Result<()> {
        let code = job_execution
            .job_instance()
            .map(|instance| instance.code())
            .unwrap_or("?");
        if job_execution.exit_status().exit_code() == ExitCode::Completed {
            info!(job = code, execution = %job_execution, "job execution completed");
        } else {
            error!(job = code, execution = %job_execution, "job execution did not complete");
        }
        Ok(())
    }
}
