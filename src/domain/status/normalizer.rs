//! Status normalizer - maps raw cycle statuses onto [`CycleStatus`].
//!
//! The records API has stored cycle status three ways over its lifetime:
//!
//! 1. Numeric codes (`0`..=`5`), sometimes sent as strings (`"3"`)
//! 2. Legacy clinical shorthand (`COS`, `OPU`, `ET`, `Preg+`, ...)
//! 3. The current enum spelling (`InProgress`, `Completed`, ...)
//!
//! Normalization never fails: unrecognized input maps to `Planned` and is
//! logged, since upstream data quality cannot be guaranteed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::CycleStatus;

/// A cycle status as it arrives from the records API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawStatus {
    Code(i64),
    Text(String),
}

impl Default for RawStatus {
    fn default() -> Self {
        RawStatus::Text(String::new())
    }
}

impl From<CycleStatus> for RawStatus {
    fn from(status: CycleStatus) -> Self {
        RawStatus::Text(status.as_str().to_string())
    }
}

impl From<&str> for RawStatus {
    fn from(raw: &str) -> Self {
        RawStatus::Text(raw.to_string())
    }
}

impl From<i64> for RawStatus {
    fn from(code: i64) -> Self {
        RawStatus::Code(code)
    }
}

impl fmt::Display for RawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawStatus::Code(code) => write!(f, "{}", code),
            RawStatus::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Maps any raw status representation onto the canonical enum.
pub fn normalize_status(raw: &RawStatus) -> CycleStatus {
    match raw {
        RawStatus::Code(code) => from_code(*code),
        RawStatus::Text(text) => from_text(text),
    }
}

fn from_code(code: i64) -> CycleStatus {
    CycleStatus::from_code(code).unwrap_or_else(|| {
        tracing::warn!(code, "Unrecognized numeric cycle status, defaulting to Planned");
        CycleStatus::Planned
    })
}

fn from_text(text: &str) -> CycleStatus {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        tracing::debug!("Empty cycle status, defaulting to Planned");
        return CycleStatus::Planned;
    }
    if let Ok(code) = trimmed.parse::<i64>() {
        return from_code(code);
    }

    let lower = trimmed.to_ascii_lowercase();
    // Pregnancy test shorthand carries meaning in its sign, so it is matched
    // before separators are stripped.
    match lower.as_str() {
        "preg+" | "preg +" => return CycleStatus::Completed,
        "preg-" | "preg -" => return CycleStatus::Failed,
        _ => {}
    }

    let compact: String = lower
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .collect();

    match compact.as_str() {
        "planned" | "plan" | "pending" | "new" | "draft" | "notstarted" => CycleStatus::Planned,
        "scheduled" | "booked" | "upcoming" => CycleStatus::Scheduled,
        "inprogress" | "active" | "ongoing" | "started" | "running" | "cos" | "opu" | "et" => {
            CycleStatus::InProgress
        }
        "completed" | "complete" | "done" | "finished" | "closed" | "pregpositive" => {
            CycleStatus::Completed
        }
        "cancelled" | "canceled" | "aborted" | "withdrawn" => CycleStatus::Cancelled,
        "failed" | "failure" | "negative" | "pregnegative" => CycleStatus::Failed,
        _ => {
            tracing::warn!(status = %trimmed, "Unrecognized cycle status, defaulting to Planned");
            CycleStatus::Planned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CycleStatus {
        normalize_status(&RawStatus::from(s))
    }

    #[test]
    fn numeric_codes_map_to_statuses() {
        assert_eq!(normalize_status(&RawStatus::Code(0)), CycleStatus::Planned);
        assert_eq!(normalize_status(&RawStatus::Code(2)), CycleStatus::InProgress);
        assert_eq!(normalize_status(&RawStatus::Code(3)), CycleStatus::Completed);
        assert_eq!(normalize_status(&RawStatus::Code(5)), CycleStatus::Failed);
    }

    #[test]
    fn numeric_strings_are_treated_as_codes() {
        assert_eq!(text("4"), CycleStatus::Cancelled);
        assert_eq!(text(" 1 "), CycleStatus::Scheduled);
    }

    #[test]
    fn legacy_clinical_shorthand() {
        assert_eq!(text("COS"), CycleStatus::InProgress);
        assert_eq!(text("OPU"), CycleStatus::InProgress);
        assert_eq!(text("ET"), CycleStatus::InProgress);
        assert_eq!(text("Preg+"), CycleStatus::Completed);
        assert_eq!(text("Preg-"), CycleStatus::Failed);
    }

    #[test]
    fn current_strings_in_any_spelling() {
        assert_eq!(text("InProgress"), CycleStatus::InProgress);
        assert_eq!(text("in_progress"), CycleStatus::InProgress);
        assert_eq!(text("IN-PROGRESS"), CycleStatus::InProgress);
        assert_eq!(text("In Progress"), CycleStatus::InProgress);
        assert_eq!(text("Completed"), CycleStatus::Completed);
        assert_eq!(text("canceled"), CycleStatus::Cancelled);
    }

    #[test]
    fn unknown_input_defaults_to_planned() {
        assert_eq!(text("on the moon"), CycleStatus::Planned);
        assert_eq!(text(""), CycleStatus::Planned);
        assert_eq!(normalize_status(&RawStatus::Code(42)), CycleStatus::Planned);
        assert_eq!(normalize_status(&RawStatus::Code(-1)), CycleStatus::Planned);
    }

    #[test]
    fn renormalizing_a_canonical_result_is_idempotent() {
        let legacy = [
            RawStatus::Code(0),
            RawStatus::Code(1),
            RawStatus::Code(2),
            RawStatus::Code(3),
            RawStatus::Code(4),
            RawStatus::Code(5),
            RawStatus::from("COS"),
            RawStatus::from("OPU"),
            RawStatus::from("ET"),
            RawStatus::from("Preg+"),
            RawStatus::from("Preg-"),
            RawStatus::from("done"),
            RawStatus::from("garbage"),
        ];
        for raw in legacy {
            let once = normalize_status(&raw);
            let twice = normalize_status(&RawStatus::from(once));
            assert_eq!(once, twice, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let code: RawStatus = serde_json::from_str("3").unwrap();
        assert_eq!(code, RawStatus::Code(3));
        let text: RawStatus = serde_json::from_str("\"OPU\"").unwrap();
        assert_eq!(text, RawStatus::Text("OPU".to_string()));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_string_normalizes_idempotently(s in ".{0,24}") {
                let once = normalize_status(&RawStatus::Text(s));
                prop_assert_eq!(once, normalize_status(&RawStatus::from(once)));
            }

            #[test]
            fn any_code_normalizes_idempotently(code in any::<i64>()) {
                let once = normalize_status(&RawStatus::Code(code));
                prop_assert_eq!(once, normalize_status(&RawStatus::Code(once.code())));
            }
        }
    }
}
