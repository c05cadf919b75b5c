//! Failure capture for execution records

use std::backtrace::Backtrace;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Placeholder used when no trace text could be captured
const TRACE_UNAVAILABLE: &str = "[trace unavailable]";

/// Extension points a fault can provide for richer capture
///
/// Any error can be snapshotted as a [`FailureException`]; faults that
/// carry a numeric code or message substitution parameters expose them
/// through this trait so the captured record keeps them.
pub trait Fault: std::error::Error {
    /// Numeric fault code; defaults to 0
    fn code(&self) -> i64 {
        0
    }

    /// Substitution values for `%placeholder%` tokens in the message
    fn message_parameters(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Type name recorded on the captured failure
    fn class_name(&self) -> String
    where
        Self: Sized,
    {
        std::any::type_name::<Self>().to_string()
    }
}

/// Immutable snapshot of a fault, captured at the moment it was observed
///
/// Capture never fails: a fault encountered while capturing a fault
/// degrades to placeholder text instead of propagating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureException {
    class: String,
    code: i64,
    message: String,
    message_parameters: HashMap<String, String>,
    trace: String,
}

impl FailureException {
    /// Build a failure record from already-extracted fields
    pub fn new(
        class: impl Into<String>,
        code: i64,
        message: impl Into<String>,
        message_parameters: HashMap<String, String>,
        trace: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            code,
            message: message.into(),
            message_parameters,
            trace: trace.into(),
        }
    }

    /// Snapshot a fault, including a backtrace of the capture site
    pub fn capture<F: Fault>(fault: &F) -> Self {
        let mut trace = format!("{fault:?}\n{}", Backtrace::force_capture());
        if trace.trim().is_empty() {
            trace = TRACE_UNAVAILABLE.to_string();
        }
        Self {
            class: fault.class_name(),
            code: fault.code(),
            message: fault.to_string(),
            message_parameters: fault.message_parameters(),
            trace,
        }
    }

    /// Type name of the fault
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Numeric fault code
    pub fn code(&self) -> i64 {
        self.code
    }

    /// Fault message, possibly containing `%placeholder%` tokens
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Substitution values for the message tokens
    pub fn message_parameters(&self) -> &HashMap<String, String> {
        &self.message_parameters
    }

    /// Stack trace text captured with the fault
    pub fn trace(&self) -> &str {
        &self.trace
    }
}
