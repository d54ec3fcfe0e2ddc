//! Per-treatment request generations for discarding superseded fetches.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::TreatmentId;

/// Ticket for one status request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    pub treatment_id: TreatmentId,
    pub value: u64,
}

#[derive(Debug, Default)]
struct Ledger {
    issued: u64,
    latest: HashMap<TreatmentId, u64>,
}

/// Tracks the newest in-flight status request per treatment.
///
/// A request is current while no newer request for the same treatment has
/// begun; results of requests that are no longer current are dropped.
/// Generation values are never reused, and a treatment's entry is removed
/// once its newest request finishes.
#[derive(Debug, Default)]
pub struct RequestGenerations {
    ledger: Mutex<Ledger>,
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request, superseding any earlier one for the treatment.
    pub fn begin(&self, treatment_id: TreatmentId) -> Generation {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.issued += 1;
        let value = ledger.issued;
        ledger.latest.insert(treatment_id, value);
        Generation {
            treatment_id,
            value,
        }
    }

    pub fn is_current(&self, generation: &Generation) -> bool {
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.latest.get(&generation.treatment_id) == Some(&generation.value)
    }

    /// Ends a request. Only the newest request for a treatment clears its entry.
    pub fn finish(&self, generation: &Generation) {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        if ledger.latest.get(&generation.treatment_id) == Some(&generation.value) {
            ledger.latest.remove(&generation.treatment_id);
        }
    }

    /// Treatments with a request in flight.
    pub fn in_flight(&self) -> usize {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_request_supersedes_older() {
        let generations = RequestGenerations::new();
        let t = TreatmentId::new();

        let first = generations.begin(t);
        assert!(generations.is_current(&first));

        let second = generations.begin(t);
        assert!(!generations.is_current(&first));
        assert!(generations.is_current(&second));
        assert!(second.value > first.value);
    }

    #[test]
    fn treatments_are_independent() {
        let generations = RequestGenerations::new();
        let a = generations.begin(TreatmentId::new());
        let _b = generations.begin(TreatmentId::new());
        assert!(generations.is_current(&a));
    }

    #[test]
    fn finished_requests_release_their_entry() {
        let generations = RequestGenerations::new();
        for _ in 0..50 {
            let g = generations.begin(TreatmentId::new());
            generations.finish(&g);
        }
        assert_eq!(generations.in_flight(), 0);
    }

    #[test]
    fn finishing_a_stale_request_keeps_the_newer_one() {
        let generations = RequestGenerations::new();
        let t = TreatmentId::new();
        let old = generations.begin(t);
        let new = generations.begin(t);

        generations.finish(&old);
        assert!(generations.is_current(&new));
        assert_eq!(generations.in_flight(), 1);
    }

    #[test]
    fn stale_request_stays_stale_after_newer_one_finishes() {
        let generations = RequestGenerations::new();
        let t = TreatmentId::new();
        let stale = generations.begin(t);
        let newer = generations.begin(t);
        generations.finish(&newer);

        let _latest = generations.begin(t);
        assert!(!generations.is_current(&stale));
    }
}
