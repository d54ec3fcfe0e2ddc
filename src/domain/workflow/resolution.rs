//! Current-step resolution procedure.
//!
//! Reconciles the cycle list and the authoritative numeric index into a
//! single `{current, completed, next}` answer:
//!
//! 1. `completed` is the union of the steps of every Completed cycle (step
//!    type, then cycle name, then the legacy `completedSteps` ids). This
//!    always runs in full.
//! 2. The active cycle is selected.
//! 3. The matching [`ResolutionChain`] names the current step.
//! 4. The current step is removed from `completed`; a step cannot be both.
//! 5. `next` is the catalog step after the current one.
//!
//! The procedure is pure and deterministic; any input list may be empty.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::catalog::{CanonicalStep, StepCatalog};
use crate::domain::foundation::{CycleId, CycleStatus};
use crate::domain::records::TreatmentCycle;

use super::active_cycle::select_active;
use super::step_resolver::{from_legacy_id, resolve_cycle_step};
use super::strategies::{ResolutionChain, ResolutionContext, ResolutionSource};

/// Inputs to one resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionInput<'a> {
    pub catalog: StepCatalog,
    pub cycles: &'a [TreatmentCycle],
    /// Zero-based index from the current-step endpoint; `None` when the
    /// endpoint returned nothing, failed, or was not consulted.
    pub authoritative_index: Option<i64>,
}

/// The derived workflow position of a treatment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResolution {
    pub current_step: Option<CanonicalStep>,
    pub completed_steps: BTreeSet<CanonicalStep>,
    pub next_step: Option<CanonicalStep>,
    pub active_cycle_id: Option<CycleId>,
    pub source: Option<ResolutionSource>,
}

impl StepResolution {
    /// Resolution for a treatment without a step catalog.
    pub fn empty() -> Self {
        Self {
            current_step: None,
            completed_steps: BTreeSet::new(),
            next_step: None,
            active_cycle_id: None,
            source: None,
        }
    }

    pub fn is_completed(&self, step: &CanonicalStep) -> bool {
        self.completed_steps.contains(step)
    }
}

/// Evaluates the two resolution chains over a cycle list.
pub struct CurrentStepResolver {
    with_active: ResolutionChain,
    without_active: ResolutionChain,
}

impl Default for CurrentStepResolver {
    fn default() -> Self {
        Self::new(
            ResolutionChain::with_active_cycle(),
            ResolutionChain::without_active_cycle(),
        )
    }
}

impl CurrentStepResolver {
    pub fn new(with_active: ResolutionChain, without_active: ResolutionChain) -> Self {
        Self {
            with_active,
            without_active,
        }
    }

    pub fn resolve(&self, input: &ResolutionInput<'_>) -> StepResolution {
        let catalog = &input.catalog;
        let mut completed = completed_steps(input.cycles, catalog);
        let active = select_active(input.cycles);

        let ctx = ResolutionContext {
            catalog,
            active_cycle: active,
            completed: &completed,
            authoritative_index: input.authoritative_index,
        };
        let chain = if active.is_some() {
            &self.with_active
        } else {
            &self.without_active
        };
        let resolved = chain.evaluate(&ctx);

        let current_step = resolved.map(|(step, _)| step);
        if let Some(step) = &current_step {
            completed.remove(step);
        }
        let next_step = current_step.and_then(|step| catalog.after(&step));

        StepResolution {
            current_step,
            completed_steps: completed,
            next_step,
            active_cycle_id: active.map(|c| c.id),
            source: resolved.map(|(_, source)| source),
        }
    }
}

/// Resolves with the default chains.
pub fn resolve_current_step(input: &ResolutionInput<'_>) -> StepResolution {
    CurrentStepResolver::default().resolve(input)
}

/// Union over every Completed cycle of its own step and the steps recorded
/// in its legacy `completed_steps` field.
pub fn completed_steps(cycles: &[TreatmentCycle], catalog: &StepCatalog) -> BTreeSet<CanonicalStep> {
    let mut completed = BTreeSet::new();
    for cycle in cycles
        .iter()
        .filter(|c| c.normalized_status() == CycleStatus::Completed)
    {
        completed.extend(resolve_cycle_step(cycle, catalog));
        completed.extend(
            cycle
                .completed_steps
                .iter()
                .filter_map(|id| from_legacy_id(id, catalog)),
        );
    }
    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Protocol, TreatmentId};
    use crate::domain::status::RawStatus;

    fn ids(steps: &BTreeSet<CanonicalStep>) -> Vec<&'static str> {
        steps.iter().map(|s| s.id).collect()
    }

    #[test]
    fn ivf_three_cycle_scenario() {
        let t = TreatmentId::new();
        let cycles = vec![
            TreatmentCycle::new(t, 1)
                .with_status(CycleStatus::Completed)
                .with_step_type("IVF_STIMULATIONSTART"),
            TreatmentCycle::new(t, 2)
                .with_status(CycleStatus::InProgress)
                .with_step_type("IVF_OPU"),
            TreatmentCycle::new(t, 3).with_status(CycleStatus::Planned),
        ];
        let resolution = resolve_current_step(&ResolutionInput {
            catalog: StepCatalog::latest(Protocol::Ivf),
            cycles: &cycles,
            authoritative_index: None,
        });

        assert_eq!(resolution.active_cycle_id, Some(cycles[1].id));
        assert_eq!(resolution.current_step.unwrap().id, "step4_opu");
        assert_eq!(ids(&resolution.completed_steps), vec!["step1_stimulation"]);
        assert_eq!(resolution.next_step.unwrap().id, "step5_fertilization");
    }

    #[test]
    fn iui_index_without_cycles() {
        let resolution = resolve_current_step(&ResolutionInput {
            catalog: StepCatalog::latest(Protocol::Iui),
            cycles: &[],
            authoritative_index: Some(2),
        });
        let catalog = StepCatalog::latest(Protocol::Iui);
        assert_eq!(resolution.current_step, catalog.at_index(2));
        assert!(resolution.completed_steps.is_empty());
        assert_eq!(resolution.source, Some(ResolutionSource::AuthoritativeIndex));
    }

    #[test]
    fn current_step_is_removed_from_completed() {
        let t = TreatmentId::new();
        // A completed cycle and the active cycle both claim OPU.
        let cycles = vec![
            TreatmentCycle::new(t, 1)
                .with_status(CycleStatus::Completed)
                .with_step_type("IVF_OPU"),
            TreatmentCycle::new(t, 2)
                .with_status(CycleStatus::InProgress)
                .with_step_type("IVF_OPU"),
        ];
        let resolution = resolve_current_step(&ResolutionInput {
            catalog: StepCatalog::latest(Protocol::Ivf),
            cycles: &cycles,
            authoritative_index: None,
        });
        let current = resolution.current_step.unwrap();
        assert_eq!(current.id, "step4_opu");
        assert!(!resolution.is_completed(&current));
    }

    #[test]
    fn completed_scan_falls_back_to_legacy_ids() {
        let t = TreatmentId::new();
        let cycles = vec![TreatmentCycle::new(t, 1)
            .with_status(RawStatus::Code(3))
            .with_name("Cycle 1")
            .with_completed_steps(["step1_stimulation", "step2_monitoring", "bogus"])];
        let completed = completed_steps(&cycles, &StepCatalog::latest(Protocol::Ivf));
        assert_eq!(ids(&completed), vec!["step1_stimulation", "step2_monitoring"]);
    }

    #[test]
    fn completed_scan_unions_step_type_with_legacy_ids() {
        let t = TreatmentId::new();
        let cycles = vec![TreatmentCycle::new(t, 1)
            .with_status(CycleStatus::Completed)
            .with_step_type("IVF_STIMULATIONSTART")
            .with_completed_steps(["step1_stimulation", "step2_monitoring"])
            .with_current_step("step3_trigger")];
        let catalog = StepCatalog::latest(Protocol::Ivf);

        let completed = completed_steps(&cycles, &catalog);
        assert_eq!(ids(&completed), vec!["step1_stimulation", "step2_monitoring"]);

        let resolution = resolve_current_step(&ResolutionInput {
            catalog,
            cycles: &cycles,
            authoritative_index: None,
        });
        assert_eq!(resolution.current_step.map(|s| s.id), Some("step3_trigger"));
    }

    #[test]
    fn completed_scan_ignores_open_cycles() {
        let t = TreatmentId::new();
        let cycles = vec![
            TreatmentCycle::new(t, 1)
                .with_status(CycleStatus::Cancelled)
                .with_step_type("IVF_STIMULATION"),
            TreatmentCycle::new(t, 2)
                .with_status(CycleStatus::InProgress)
                .with_completed_steps(["step1_stimulation"]),
        ];
        assert!(completed_steps(&cycles, &StepCatalog::latest(Protocol::Ivf)).is_empty());
    }

    #[test]
    fn next_step_is_none_at_last_step() {
        let t = TreatmentId::new();
        let cycles = vec![TreatmentCycle::new(t, 1)
            .with_status(CycleStatus::InProgress)
            .with_step_type("IVF_BETA_HCG")];
        let resolution = resolve_current_step(&ResolutionInput {
            catalog: StepCatalog::latest(Protocol::Ivf),
            cycles: &cycles,
            authoritative_index: None,
        });
        assert_eq!(resolution.current_step.unwrap().id, "step8_pregnancy_test");
        assert!(resolution.next_step.is_none());
    }

    #[test]
    fn all_completed_yields_no_current_or_next() {
        let t = TreatmentId::new();
        let catalog = StepCatalog::latest(Protocol::Iui);
        let cycles = vec![TreatmentCycle::new(t, 1)
            .with_status(CycleStatus::Completed)
            .with_step_type("IUI_PREGNANCY_TEST")];
        let resolution = resolve_current_step(&ResolutionInput {
            catalog,
            cycles: &cycles,
            authoritative_index: None,
        });
        assert!(resolution.current_step.is_none());
        assert!(resolution.next_step.is_none());
        assert!(resolution.active_cycle_id.is_none());
    }

    mod properties {
        use super::*;
        use crate::domain::catalog::CatalogVersion;
        use proptest::prelude::*;

        const CODES: &[&str] = &[
            "IVF_STIMULATIONSTART",
            "IVF_OPU",
            "IVF_ET",
            "IVF_ICSI",
            "POST_IUI",
            "IUI",
            "IUI_TRIGGER",
            "UNKNOWN",
            "",
        ];

        const LEGACY_IDS: &[&str] = &[
            "step1_stimulation",
            "step4_opu",
            "step5_iui",
            "step7_pregnancy_test",
            "nope",
        ];

        fn cycle_strategy() -> impl Strategy<Value = (u32, CycleStatus, usize, Option<usize>)> {
            (
                1u32..6,
                prop::sample::select(CycleStatus::ALL.to_vec()),
                0..CODES.len(),
                prop::option::of(0..LEGACY_IDS.len()),
            )
        }

        proptest! {
            #[test]
            fn current_is_never_completed_and_next_follows_current(
                specs in prop::collection::vec(cycle_strategy(), 0..7),
                index in prop::option::of(-2i64..10),
                ivf in any::<bool>(),
                v1 in any::<bool>(),
            ) {
                let protocol = if ivf { Protocol::Ivf } else { Protocol::Iui };
                let version = if v1 { CatalogVersion::V1 } else { CatalogVersion::V2 };
                let catalog = StepCatalog::new(protocol, version);
                let t = TreatmentId::new();
                let cycles: Vec<TreatmentCycle> = specs
                    .into_iter()
                    .map(|(n, status, code, legacy)| {
                        let mut c = TreatmentCycle::new(t, n)
                            .with_status(status)
                            .with_step_type(CODES[code]);
                        c.current_step = legacy.map(|i| LEGACY_IDS[i].to_string());
                        c
                    })
                    .collect();

                let resolution = resolve_current_step(&ResolutionInput {
                    catalog,
                    cycles: &cycles,
                    authoritative_index: index,
                });

                if let Some(current) = resolution.current_step {
                    prop_assert!(!resolution.completed_steps.contains(&current));
                    prop_assert!(catalog.contains(&current));
                    let is_last = catalog.last() == Some(current);
                    prop_assert_eq!(resolution.next_step.is_none(), is_last);
                } else {
                    prop_assert!(resolution.next_step.is_none());
                }
                for step in &resolution.completed_steps {
                    prop_assert!(catalog.contains(step));
                }
            }
        }
    }
}
