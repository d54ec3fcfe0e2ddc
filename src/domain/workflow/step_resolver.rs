//! Step identifier resolver - infers a canonical step from raw cycle signals.
//!
//! Three independent signals can name a step:
//!
//! - a categorical step-type code (`IVF_OPU`), classified by ordered rules
//! - a free-text cycle name (`Egg collection`), classified the same way
//! - a zero-based numeric index from the dedicated current-step endpoint
//!
//! None of these fail on unmatched input. The classifiers report an explicit
//! [`StepSignal`]; the `from_*` functions are the `Option` views the
//! resolution chain consumes.

use crate::domain::catalog::{CanonicalStep, StepCatalog, StepKind};
use crate::domain::records::TreatmentCycle;

use super::step_rules::{cycle_name_rules, first_match, step_type_rules, NormalizedInput};

/// Outcome of classifying one textual signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepSignal {
    /// No input to classify (missing or blank).
    Absent,
    /// A rule matched and the step exists in the catalog.
    Matched(CanonicalStep),
    /// A rule matched a kind that this catalog version does not include.
    OutOfCatalog(StepKind),
    /// Input present but no rule matched.
    Unknown(String),
}

impl StepSignal {
    pub fn step(&self) -> Option<CanonicalStep> {
        match self {
            StepSignal::Matched(step) => Some(*step),
            _ => None,
        }
    }
}

/// Classifies a categorical step-type code.
pub fn classify_step_type(code: Option<&str>, catalog: &StepCatalog) -> StepSignal {
    let Some(raw) = code.map(str::trim).filter(|c| !c.is_empty()) else {
        return StepSignal::Absent;
    };
    let upper = raw.to_ascii_uppercase();
    let kind = first_match(
        step_type_rules(catalog.protocol()),
        &NormalizedInput::new(&upper),
    );
    signal_for(kind, raw, catalog)
}

/// Classifies a free-text cycle name.
pub fn classify_cycle_name(name: Option<&str>, catalog: &StepCatalog) -> StepSignal {
    let Some(raw) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return StepSignal::Absent;
    };
    let lower = raw.to_ascii_lowercase();
    let kind = first_match(
        cycle_name_rules(catalog.protocol()),
        &NormalizedInput::new(&lower),
    );
    signal_for(kind, raw, catalog)
}

fn signal_for(kind: Option<StepKind>, raw: &str, catalog: &StepCatalog) -> StepSignal {
    match kind {
        None => StepSignal::Unknown(raw.to_string()),
        Some(kind) => match catalog.by_kind(kind) {
            Some(step) => StepSignal::Matched(step),
            None => StepSignal::OutOfCatalog(kind),
        },
    }
}

/// Resolves a step-type code to a step in `catalog`.
///
/// Codes the backend sends that match no rule are logged; they usually mean
/// a new code was introduced server-side.
pub fn from_step_type_code(code: &str, catalog: &StepCatalog) -> Option<CanonicalStep> {
    match classify_step_type(Some(code), catalog) {
        StepSignal::Matched(step) => Some(step),
        StepSignal::Unknown(raw) => {
            tracing::warn!(
                code = %raw,
                protocol = %catalog.protocol(),
                "Unknown step type code"
            );
            None
        }
        StepSignal::OutOfCatalog(kind) => {
            tracing::debug!(
                %kind,
                version = ?catalog.version(),
                "Step type names a step outside this catalog version"
            );
            None
        }
        StepSignal::Absent => None,
    }
}

/// Resolves a free-text cycle name to a step in `catalog`.
pub fn from_cycle_name(name: &str, catalog: &StepCatalog) -> Option<CanonicalStep> {
    let signal = classify_cycle_name(Some(name), catalog);
    if let StepSignal::Unknown(raw) = &signal {
        tracing::debug!(name = %raw, "Cycle name does not identify a step");
    }
    signal.step()
}

/// Translates the authoritative zero-based index. Out of range yields `None`.
pub fn from_numeric_index(index: i64, catalog: &StepCatalog) -> Option<CanonicalStep> {
    usize::try_from(index).ok().and_then(|i| catalog.at_index(i))
}

/// Resolves a persisted legacy step id.
pub fn from_legacy_id(id: &str, catalog: &StepCatalog) -> Option<CanonicalStep> {
    catalog.by_id(id)
}

/// The step a cycle represents: step-type code first, cycle name second.
pub fn resolve_cycle_step(cycle: &TreatmentCycle, catalog: &StepCatalog) -> Option<CanonicalStep> {
    cycle
        .step_type
        .as_deref()
        .and_then(|code| from_step_type_code(code, catalog))
        .or_else(|| {
            cycle
                .cycle_name
                .as_deref()
                .and_then(|name| from_cycle_name(name, catalog))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CatalogVersion;
    use crate::domain::foundation::{Protocol, TreatmentId};

    fn ivf() -> StepCatalog {
        StepCatalog::latest(Protocol::Ivf)
    }

    fn iui() -> StepCatalog {
        StepCatalog::latest(Protocol::Iui)
    }

    #[test]
    fn step_type_code_is_case_insensitive() {
        assert_eq!(from_step_type_code("ivf_opu", &ivf()).unwrap().id, "step4_opu");
        assert_eq!(from_step_type_code("  IVF_OPU ", &ivf()).unwrap().id, "step4_opu");
    }

    #[test]
    fn post_iui_code_resolves_to_post_procedure_step() {
        assert_eq!(
            from_step_type_code("IUI_POST_PROCEDURE", &iui()).unwrap().id,
            "step6_post_iui"
        );
    }

    #[test]
    fn unmatched_inputs_return_none() {
        assert!(from_step_type_code("SOMETHING_NEW", &ivf()).is_none());
        assert!(from_cycle_name("Cycle 2", &ivf()).is_none());
        assert!(from_step_type_code("", &ivf()).is_none());
    }

    #[test]
    fn classify_reports_unknown_and_absent_explicitly() {
        assert_eq!(classify_step_type(None, &ivf()), StepSignal::Absent);
        assert_eq!(classify_step_type(Some("   "), &ivf()), StepSignal::Absent);
        assert_eq!(
            classify_step_type(Some("XYZ"), &ivf()),
            StepSignal::Unknown("XYZ".to_string())
        );
    }

    #[test]
    fn kinds_missing_from_version_are_out_of_catalog() {
        let v1 = StepCatalog::new(Protocol::Ivf, CatalogVersion::V1);
        assert_eq!(
            classify_step_type(Some("IVF_TRIGGER"), &v1),
            StepSignal::OutOfCatalog(StepKind::Trigger)
        );
        assert!(from_step_type_code("IVF_TRIGGER", &v1).is_none());
    }

    #[test]
    fn numeric_index_is_zero_based_and_bounded() {
        assert_eq!(from_numeric_index(0, &iui()).unwrap().id, "step1_consultation");
        assert_eq!(from_numeric_index(2, &iui()).unwrap().id, "step3_monitoring");
        assert!(from_numeric_index(7, &iui()).is_none());
        assert!(from_numeric_index(-1, &iui()).is_none());
    }

    #[test]
    fn cycle_step_prefers_step_type_over_name() {
        let cycle = TreatmentCycle::new(TreatmentId::new(), 1)
            .with_step_type("IVF_OPU")
            .with_name("Embryo transfer");
        assert_eq!(resolve_cycle_step(&cycle, &ivf()).unwrap().id, "step4_opu");
    }

    #[test]
    fn cycle_step_falls_back_to_name() {
        let cycle = TreatmentCycle::new(TreatmentId::new(), 1)
            .with_step_type("UNMAPPED")
            .with_name("Embryo transfer");
        assert_eq!(
            resolve_cycle_step(&cycle, &ivf()).unwrap().id,
            "step7_embryo_transfer"
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn catalogs() -> Vec<StepCatalog> {
            vec![
                StepCatalog::new(Protocol::Ivf, CatalogVersion::V1),
                StepCatalog::new(Protocol::Ivf, CatalogVersion::V2),
                StepCatalog::new(Protocol::Iui, CatalogVersion::V1),
                StepCatalog::new(Protocol::Iui, CatalogVersion::V2),
            ]
        }

        proptest! {
            #[test]
            fn step_type_results_are_catalog_members(code in "[A-Za-z_ +-]{0,24}") {
                for catalog in catalogs() {
                    if let Some(step) = from_step_type_code(&code, &catalog) {
                        prop_assert!(catalog.contains(&step));
                    }
                }
            }

            #[test]
            fn cycle_name_results_are_catalog_members(name in "[a-zA-Z0-9 ()-]{0,32}") {
                for catalog in catalogs() {
                    if let Some(step) = from_cycle_name(&name, &catalog) {
                        prop_assert!(catalog.contains(&step));
                    }
                }
            }

            #[test]
            fn numeric_index_results_are_catalog_members(index in -4i64..16) {
                for catalog in catalogs() {
                    match from_numeric_index(index, &catalog) {
                        Some(step) => prop_assert!(catalog.contains(&step)),
                        None => prop_assert!(index < 0 || index as usize >= catalog.len()),
                    }
                }
            }
        }
    }
}
