//! Lifecycle transitions for status enums.
//!
//! Implementors list which moves are legal; `transition_to` turns an illegal
//! move into an `InvalidStateTransition` error that names both ends.

use std::fmt::Display;

use super::{DomainError, ErrorCode};

pub trait StateMachine: Sized + Copy + PartialEq + Display {
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Every status reachable in one move.
    fn valid_transitions(&self) -> Vec<Self>;

    fn transition_to(&self, target: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(&target) {
            return Ok(target);
        }
        let allowed: Vec<String> = self.valid_transitions().iter().map(ToString::to_string).collect();
        Err(DomainError::new(
            ErrorCode::InvalidStateTransition,
            format!("Cannot move from {} to {}", self, target),
        )
        .with_detail("from", self.to_string())
        .with_detail("to", target.to_string())
        .with_detail("allowed", allowed.join(",")))
    }

    /// No outgoing moves.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CycleStatus;

    #[test]
    fn legal_move_returns_target() {
        assert_eq!(
            CycleStatus::Scheduled.transition_to(CycleStatus::InProgress).unwrap(),
            CycleStatus::InProgress
        );
    }

    #[test]
    fn illegal_move_names_allowed_targets() {
        let err = CycleStatus::Planned
            .transition_to(CycleStatus::Completed)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(err.details.get("from").map(String::as_str), Some("Planned"));
        assert_eq!(
            err.details.get("allowed").map(String::as_str),
            Some("Scheduled,InProgress,Cancelled")
        );
    }

    #[test]
    fn every_valid_transition_is_accepted() {
        for from in CycleStatus::ALL {
            for to in from.valid_transitions() {
                assert!(from.can_transition_to(&to), "{} -> {}", from, to);
            }
        }
    }
}
