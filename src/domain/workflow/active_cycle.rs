//! Active cycle selector.
//!
//! Cycles are worked in strict numeric order: the active cycle is the open
//! (not completed, cancelled or failed) cycle with the lowest `cycle_number`,
//! regardless of which cycles carry richer step metadata. The data does not
//! enforce a single open cycle, so several may qualify; ties on
//! `cycle_number` fall back to `order_index`, then id, so the answer never
//! depends on input order.

use std::cmp::Ordering;

use crate::domain::records::TreatmentCycle;

/// Picks the cycle that currently represents treatment progress.
pub fn select_active(cycles: &[TreatmentCycle]) -> Option<&TreatmentCycle> {
    cycles
        .iter()
        .filter(|c| !c.normalized_status().is_finished())
        .min_by(|a, b| active_order(a, b))
}

fn active_order(a: &TreatmentCycle, b: &TreatmentCycle) -> Ordering {
    a.cycle_number
        .cmp(&b.cycle_number)
        .then_with(|| {
            // Missing order_index sorts after any explicit one.
            let ka = a.order_index.map_or(i64::MAX, i64::from);
            let kb = b.order_index.map_or(i64::MAX, i64::from);
            ka.cmp(&kb)
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Cycles in progression order (`order_index`, else `cycle_number`).
pub fn ordered_cycles(cycles: &[TreatmentCycle]) -> Vec<&TreatmentCycle> {
    let mut ordered: Vec<&TreatmentCycle> = cycles.iter().collect();
    ordered.sort_by_key(|c| c.progression_key());
    ordered
}

/// The cycle that follows `current` in progression order, if any.
pub fn next_cycle<'a>(
    cycles: &'a [TreatmentCycle],
    current: &TreatmentCycle,
) -> Option<&'a TreatmentCycle> {
    let current_key = current.progression_key();
    ordered_cycles(cycles)
        .into_iter()
        .filter(|c| c.id != current.id && c.treatment_id == current.treatment_id)
        .find(|c| c.progression_key() > current_key)
}
