//! Lifecycle status of a job or step execution

use serde::{Deserialize, Serialize};

/// Lifecycle state of an execution record
///
/// Two orderings apply. The wire value returned by [`value`](Self::value)
/// is a compatibility contract for log tooling and storage. Upgrades use a
/// separate severity order in which a terminal, worse-known state always
/// wins: `Starting < Started < Stopping < Stopped < Completed < Failed <
/// Abandoned < Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// Execution ran to a successful end
    Completed,
    /// Execution record created, no work started yet
    Starting,
    /// Execution is running
    Started,
    /// A stop was requested and is being honored
    Stopping,
    /// Execution stopped cooperatively before finishing
    Stopped,
    /// Execution ended with at least one unrecovered fault
    Failed,
    /// Execution was given up on by an operator
    Abandoned,
    /// State is indeterminate, e.g. after a crash
    Unknown,
}

impl BatchStatus {
    /// Wire value of this status; stable across releases
    pub fn value(self) -> u8 {
        match self {
            BatchStatus::Completed => 1,
            BatchStatus::Starting => 2,
            BatchStatus::Started => 3,
            BatchStatus::Stopping => 4,
            BatchStatus::Stopped => 5,
            BatchStatus::Failed => 6,
            BatchStatus::Abandoned => 7,
            BatchStatus::Unknown => 8,
        }
    }

    /// Map a wire value back to a status; unrecognized values become
    /// [`Unknown`](BatchStatus::Unknown)
    pub fn from_value(value: u8) -> Self {
        match value {
            1 => BatchStatus::Completed,
            2 => BatchStatus::Starting,
            3 => BatchStatus::Started,
            4 => BatchStatus::Stopping,
            5 => BatchStatus::Stopped,
            6 => BatchStatus::Failed,
            7 => BatchStatus::Abandoned,
            _ => BatchStatus::Unknown,
        }
    }

    /// Rank under the upgrade severity order
    fn severity(self) -> u8 {
        match self {
            BatchStatus::Starting => 0,
            BatchStatus::Started => 1,
            BatchStatus::Stopping => 2,
            BatchStatus::Stopped => 3,
            BatchStatus::Completed => 4,
            BatchStatus::Failed => 5,
            BatchStatus::Abandoned => 6,
            BatchStatus::Unknown => 7,
        }
    }

    /// Return the more severe of `self` and `candidate`
    ///
    /// Idempotent and monotonic: upgrading to an equal or less severe
    /// status is a no-op, never an error.
    #[must_use]
    pub fn upgrade(self, candidate: BatchStatus) -> BatchStatus {
        if candidate.severity() > self.severity() {
            candidate
        } else {
            self
        }
    }

    /// Execution record exists but no work has started
    pub fn is_starting(self) -> bool {
        self == BatchStatus::Starting
    }

    /// Execution is in flight (starting or started)
    pub fn is_running(self) -> bool {
        matches!(self, BatchStatus::Starting | BatchStatus::Started)
    }

    /// A stop request is being honored
    pub fn is_stopping(self) -> bool {
        self == BatchStatus::Stopping
    }

    /// Execution ended badly (failed, abandoned or indeterminate)
    pub fn is_unsuccessful(self) -> bool {
        matches!(
            self,
            BatchStatus::Failed | BatchStatus::Abandoned | BatchStatus::Unknown
        )
    }
}

impl Default for BatchStatus {
    fn default() -> Self {
        BatchStatus::Starting
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BatchStatus::Completed => "COMPLETED",
            BatchStatus::Starting => "STARTING",
            BatchStatus::Started => "STARTED",
            BatchStatus::Stopping => "STOPPING",
            BatchStatus::Stopped => "STOPPED",
            BatchStatus::Failed => "FAILED",
            BatchStatus::Abandoned => "ABANDONED",
            BatchStatus::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL: [BatchStatus; 8] = [
        BatchStatus::Completed,
        BatchStatus::Starting,
        BatchStatus::Started,
        BatchStatus::Stopping,
        BatchStatus::Stopped,
        BatchStatus::Failed,
        BatchStatus::Abandoned,
        BatchStatus::Unknown,
    ];

    fn any_status() -> impl Strategy<Value = BatchStatus> {
        prop::sample::select(ALL.to_vec())
    }

    #[test]
    fn test_default_is_starting() {
        assert_eq!(BatchStatus::default(), BatchStatus::Starting);
    }

    #[test]
    fn test_wire_values_are_stable() {
        assert_eq!(BatchStatus::Completed.value(), 1);
        assert_eq!(BatchStatus::Starting.value(), 2);
        assert_eq!(BatchStatus::Started.value(), 3);
        assert_eq!(BatchStatus::Stopping.value(), 4);
        assert_eq!(BatchStatus::Stopped.value(), 5);
        assert_eq!(BatchStatus::Failed.value(), 6);
        assert_eq!(BatchStatus::Abandoned.value(), 7);
        assert_eq!(BatchStatus::Unknown.value(), 8);
    }

    #[test]
    fn test_from_value_round_trips() {
        for status in ALL {
            assert_eq!(BatchStatus::from_value(status.value()), status);
        }
        assert_eq!(BatchStatus::from_value(0), BatchStatus::Unknown);
        assert_eq!(BatchStatus::from_value(42), BatchStatus::Unknown);
    }

    #[test]
    fn test_upgrade_moves_forward_only() {
        let status = BatchStatus::Started;
        assert_eq!(status.upgrade(BatchStatus::Completed), BatchStatus::Completed);
        assert_eq!(status.upgrade(BatchStatus::Starting), BatchStatus::Started);

        let failed = BatchStatus::Failed;
        assert_eq!(failed.upgrade(BatchStatus::Completed), BatchStatus::Failed);
        assert_eq!(failed.upgrade(BatchStatus::Unknown), BatchStatus::Unknown);
    }

    #[test]
    fn test_completed_outranks_stopped() {
        assert_eq!(
            BatchStatus::Stopped.upgrade(BatchStatus::Completed),
            BatchStatus::Completed
        );
        assert_eq!(
            BatchStatus::Completed.upgrade(BatchStatus::Stopped),
            BatchStatus::Completed
        );
    }

    #[test]
    fn test_predicates() {
        assert!(BatchStatus::Starting.is_starting());
        assert!(!BatchStatus::Started.is_starting());

        assert!(BatchStatus::Starting.is_running());
        assert!(BatchStatus::Started.is_running());
        assert!(!BatchStatus::Stopping.is_running());
        assert!(!BatchStatus::Completed.is_running());

        assert!(BatchStatus::Stopping.is_stopping());
        assert!(!BatchStatus::Stopped.is_stopping());

        assert!(BatchStatus::Failed.is_unsuccessful());
        assert!(BatchStatus::Abandoned.is_unsuccessful());
        assert!(BatchStatus::Unknown.is_unsuccessful());
        assert!(!BatchStatus::Completed.is_unsuccessful());
    }

    #[test]
    fn test_display_renders_names() {
        assert_eq!(BatchStatus::Starting.to_string(), "STARTING");
        assert_eq!(BatchStatus::Failed.to_string(), "FAILED");
    }

    proptest! {
        #[test]
        fn prop_upgrade_is_max_under_severity(a in any_status(), b in any_status()) {
            let upgraded = a.upgrade(b);
            prop_assert!(upgraded == a || upgraded == b);
            prop_assert_eq!(a.upgrade(b), b.upgrade(a));
        }

        #[test]
        fn prop_upgrade_is_idempotent(a in any_status(), b in any_status()) {
            let once = a.upgrade(b);
            prop_assert_eq!(once.upgrade(b), once);
        }

        #[test]
        fn prop_unknown_is_maximal(a in any_status()) {
            prop_assert_eq!(a.upgrade(BatchStatus::Unknown), BatchStatus::Unknown);
            prop_assert_eq!(BatchStatus::Unknown.upgrade(a), BatchStatus::Unknown);
        }
    }
}
