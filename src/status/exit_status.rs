//! Terminal outcome descriptor for an execution

use serde::{Deserialize, Serialize};

/// Delimiter between description segments when statuses are combined
const DESCRIPTION_DELIMITER: &str = "; ";

/// Fixed vocabulary of exit codes
///
/// Severity for combination purposes: `Completed < Executing < Noop <
/// Stopped < Failed < Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitCode {
    /// Finished processing with no error
    Completed,
    /// Still processing, no outcome known yet
    Executing,
    /// Finished without doing any work
    Noop,
    /// Stopped before finishing
    Stopped,
    /// Ended with an error
    Failed,
    /// Outcome cannot be determined
    Unknown,
}

impl ExitCode {
    /// Rank under the combination severity order
    fn severity(self) -> u8 {
        match self {
            ExitCode::Completed => 0,
            ExitCode::Executing => 1,
            ExitCode::Noop => 2,
            ExitCode::Stopped => 3,
            ExitCode::Failed => 4,
            ExitCode::Unknown => 5,
        }
    }

    /// Stable text form of the code
    pub fn as_str(self) -> &'static str {
        match self {
            ExitCode::Completed => "COMPLETED",
            ExitCode::Executing => "EXECUTING",
            ExitCode::Noop => "NOOP",
            ExitCode::Stopped => "STOPPED",
            ExitCode::Failed => "FAILED",
            ExitCode::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of an execution: an exit code plus free-text description
///
/// Value semantics throughout: two exit statuses with the same code and
/// description are equal, and [`and`](Self::and) returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatus {
    exit_code: ExitCode,
    exit_description: String,
}

impl ExitStatus {
    /// Create an exit status with an empty description
    pub fn new(exit_code: ExitCode) -> Self {
        Self {
            exit_code,
            exit_description: String::new(),
        }
    }

    /// Create an exit status with a description
    pub fn with_description(exit_code: ExitCode, description: impl Into<String>) -> Self {
        Self {
            exit_code,
            exit_description: description.into(),
        }
    }

    /// Convenience constructor for [`ExitCode::Completed`]
    pub fn completed() -> Self {
        Self::new(ExitCode::Completed)
    }

    /// Convenience constructor for [`ExitCode::Executing`]
    pub fn executing() -> Self {
        Self::new(ExitCode::Executing)
    }

    /// Convenience constructor for [`ExitCode::Noop`]
    pub fn noop() -> Self {
        Self::new(ExitCode::Noop)
    }

    /// Convenience constructor for [`ExitCode::Stopped`]
    pub fn stopped() -> Self {
        Self::new(ExitCode::Stopped)
    }

    /// Convenience constructor for [`ExitCode::Failed`]
    pub fn failed() -> Self {
        Self::new(ExitCode::Failed)
    }

    /// Convenience constructor for [`ExitCode::Unknown`]
    pub fn unknown() -> Self {
        Self::new(ExitCode::Unknown)
    }

    /// The exit code
    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    /// The free-text description
    pub fn exit_description(&self) -> &str {
        &self.exit_description
    }

    /// Combine with another exit status
    ///
    /// The result keeps the more severe of the two codes and concatenates
    /// the non-empty descriptions, `self` first, skipping segments already
    /// present.
    #[must_use]
    pub fn and(&self, other: &ExitStatus) -> ExitStatus {
        let mut combined = self.clone();
        if other.exit_code.severity() > self.exit_code.severity() {
            combined.exit_code = other.exit_code;
        }
        combined.add_exit_description(&other.exit_description);
        combined
    }

    /// Append a segment to the description
    ///
    /// Empty segments and segments already present are skipped, so the
    /// description never accumulates noise when statuses are re-combined.
    pub fn add_exit_description(&mut self, description: &str) -> &mut Self {
        let segment = description.trim();
        if segment.is_empty() || self.contains_segment(segment) {
            return self;
        }
        if !self.exit_description.is_empty() {
            self.exit_description.push_str(DESCRIPTION_DELIMITER);
        }
        self.exit_description.push_str(segment);
        self
    }

    fn contains_segment(&self, segment: &str) -> bool {
        self.exit_description
            .split(DESCRIPTION_DELIMITER)
            .any(|existing| existing == segment)
    }
}

impl Default for ExitStatus {
    fn default() -> Self {
        Self::executing()
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.exit_code, self.exit_description)
    }
}
