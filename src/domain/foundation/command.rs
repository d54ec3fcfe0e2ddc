//! Who issued a cycle command.
//!
//! Mutating handlers take a `CommandMetadata` next to the command. Its
//! correlation id is fixed at construction so the completion, the gate
//! checks and the automatic start of the next cycle all log under one id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Clinician or service account acting on the treatment.
    pub actor: String,

    correlation_id: String,

    /// Where the command came from, such as "ui" or "scheduler".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    /// Metadata with a freshly generated correlation id.
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            correlation_id: Uuid::new_v4().to_string(),
            source: None,
        }
    }

    /// Reuses a correlation id from an upstream request.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = id.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

#[cfg(test)]
impl CommandMetadata {
    pub fn test_fixture() -> Self {
        Self::new("clinician-test")
            .with_correlation_id("test-correlation-id")
            .with_source("test")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_id_is_stable_across_reads() {
        let metadata = CommandMetadata::new("dr-okafor");
        assert!(!metadata.correlation_id().is_empty());
        assert_eq!(metadata.correlation_id(), metadata.correlation_id());
    }

    #[test]
    fn upstream_correlation_id_wins() {
        let metadata = CommandMetadata::new("scheduler").with_correlation_id("req-42");
        assert_eq!(metadata.correlation_id(), "req-42");
    }

    #[test]
    fn separate_commands_get_separate_ids() {
        let a = CommandMetadata::new("dr-okafor");
        let b = CommandMetadata::new("dr-okafor");
        assert_ne!(a.correlation_id(), b.correlation_id());
    }

    #[test]
    fn source_is_omitted_from_json_when_unset() {
        let json = serde_json::to_value(CommandMetadata::new("dr-okafor")).unwrap();
        assert_eq!(json["actor"], "dr-okafor");
        assert!(json.get("source").is_none());
        assert!(json["correlation_id"].is_string());
    }
}
