//! Lifecycle and exit status state machines
//!
//! [`BatchStatus`] tracks where an execution is in its lifecycle,
//! [`ExitStatus`] records how it ended. Both are value types: upgrading or
//! combining returns a new value instead of mutating in place, so the
//! severity-ordering rules cannot be bypassed by hidden mutation.

pub mod batch_status;
pub mod exit_status;

pub use batch_status::BatchStatus;
pub use exit_status::{ExitCode, ExitStatus};
