//! CycleStatus enum for tracking the lifecycle of treatment cycles.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Canonical lifecycle status of a treatment cycle.
///
/// Raw statuses from the records API come in several historical shapes; see
/// `domain::status::normalize_status` for the mapping onto this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum CycleStatus {
    #[default]
    Planned,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Failed,
}

impl CycleStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [CycleStatus; 6] = [
        CycleStatus::Planned,
        CycleStatus::Scheduled,
        CycleStatus::InProgress,
        CycleStatus::Completed,
        CycleStatus::Cancelled,
        CycleStatus::Failed,
    ];

    /// Returns true once the cycle can no longer change (completed, cancelled or failed).
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            CycleStatus::Completed | CycleStatus::Cancelled | CycleStatus::Failed
        )
    }

    /// Returns true if the cycle is waiting to be started.
    pub fn is_startable(&self) -> bool {
        matches!(self, CycleStatus::Planned | CycleStatus::Scheduled)
    }

    /// Canonical wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Planned => "Planned",
            CycleStatus::Scheduled => "Scheduled",
            CycleStatus::InProgress => "InProgress",
            CycleStatus::Completed => "Completed",
            CycleStatus::Cancelled => "Cancelled",
            CycleStatus::Failed => "Failed",
        }
    }

    /// Numeric code used by older records.
    pub fn code(&self) -> i64 {
        match self {
            CycleStatus::Planned => 0,
            CycleStatus::Scheduled => 1,
            CycleStatus::InProgress => 2,
            CycleStatus::Completed => 3,
            CycleStatus::Cancelled => 4,
            CycleStatus::Failed => 5,
        }
    }

    /// Inverse of [`CycleStatus::code`].
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.code() == code)
    }
}

impl StateMachine for CycleStatus {
    /// Valid transitions:
    /// - Planned -> Scheduled | InProgress | Cancelled
    /// - Scheduled -> InProgress | Cancelled
    /// - InProgress -> Completed | Failed | Cancelled
    fn can_transition_to(&self, target: &Self) -> bool {
        use CycleStatus::*;
        matches!(
            (self, target),
            (Planned, Scheduled)
                | (Planned, InProgress)
                | (Scheduled, InProgress)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (Planned, Cancelled)
                | (Scheduled, Cancelled)
                | (InProgress, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CycleStatus::*;
        match self {
            Planned => vec![Scheduled, InProgress, Cancelled],
            Scheduled => vec![InProgress, Cancelled],
            InProgress => vec![Completed, Failed, Cancelled],
            Completed | Cancelled | Failed => vec![],
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
