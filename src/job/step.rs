//! Step unit-of-work abstraction

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::execution::{Fault, StepExecution};

/// Fault raised by a step's unit of work
///
/// Anything escaping a step is caught at the orchestration boundary and
/// captured on the step execution; it never propagates past the driver.
#[derive(Debug, Error)]
pub enum StepError {
    /// Domain fault with a numeric code and message substitution
    /// parameters for `%placeholder%` tokens
    #[error("{message}")]
    Runtime {
        /// Numeric fault code
        code: i64,
        /// Message, possibly containing `%placeholder%` tokens
        message: String,
        /// Substitution values for the message tokens
        parameters: HashMap<String, String>,
    },

    /// The step detected an interruption request and gave up mid-work;
    /// treated as stopped rather than failed
    #[error("step execution was interrupted")]
    Interrupted,

    /// Any other fault
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StepError {
    /// Build a runtime fault without substitution parameters
    pub fn runtime(code: i64, message: impl Into<String>) -> Self {
        StepError::Runtime {
            code,
            message: message.into(),
            parameters: HashMap::new(),
        }
    }
}

impl Fault for StepError {
    fn code(&self) -> i64 {
        match self {
            StepError::Runtime { code, .. } => *code,
            StepError::Interrupted | StepError::Other(_) => 0,
        }
    }

    fn message_parameters(&self) -> HashMap<String, String> {
        match self {
            StepError::Runtime { parameters, .. } => parameters.clone(),
            StepError::Interrupted | StepError::Other(_) => HashMap::new(),
        }
    }

    fn class_name(&self) -> String {
        match self {
            StepError::Runtime { .. } => "RuntimeError".to_string(),
            StepError::Interrupted => "Interrupted".to_string(),
            StepError::Other(_) => "Error".to_string(),
        }
    }
}

/// A step's unit of work, invoked once per step by the job driver
///
/// Implementations mutate the step execution's counters, context and
/// warnings, and either return normally, observe the terminate-only flag
/// and stop, or raise a fault.
#[async_trait]
pub trait Step: Send + Sync {
    /// Step name, unique within a job; used as the execution lookup key
    fn name(&self) -> &str;

    /// Whether a failure of this step aborts the remaining steps
    ///
    /// Defaults to false: a failed step is recorded and the job moves on,
    /// aggregation stays correct regardless of how many steps fail.
    fn is_blocker(&self) -> bool {
        false
    }

    /// Run the unit of work against this step's execution record
    async fn execute(&self, step_execution: &mut StepExecution) -> Result<(), StepError>;
}
