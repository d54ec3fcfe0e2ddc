//! Feature flags configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::workflow::DEFAULT_CACHE_CAPACITY;

/// Switches for the workflow gates and automatic progression
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Require both agreement signatures before IUI/IVF cycles leave planning
    #[serde(default = "enabled")]
    pub enforce_consent_gate: bool,

    /// Require quality-checked samples before milestone cycles complete
    #[serde(default = "enabled")]
    pub enforce_sample_gate: bool,

    /// Start the next planned cycle after a cycle completes
    #[serde(default = "enabled")]
    pub auto_start_next_cycle: bool,

    /// Entries kept by the resolution cache before it is cleared
    #[serde(default = "default_cache_capacity")]
    pub resolution_cache_capacity: usize,
}

fn enabled() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enforce_consent_gate: true,
            enforce_sample_gate: true,
            auto_start_next_cycle: true,
            resolution_cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl FeatureFlags {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.resolution_cache_capacity == 0 {
            return Err(ValidationError::InvalidCacheCapacity);
        }
        Ok(())
    }
}
