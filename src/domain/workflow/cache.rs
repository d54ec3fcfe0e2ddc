//! Memoised resolutions keyed by a content hash of the inputs.
//!
//! Resolution is pure, so two calls with the same catalog, index and cycle
//! contents always agree. The key is a SHA-256 digest over those inputs with
//! cycles sorted by id, which makes it independent of fetch order.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::resolution::{CurrentStepResolver, ResolutionInput, StepResolution};

/// Default number of entries kept before the cache is cleared.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Content hash of a resolution input, hex encoded.
pub fn content_key(input: &ResolutionInput<'_>) -> String {
    let mut cycles: Vec<_> = input.cycles.iter().collect();
    cycles.sort_by_key(|c| c.id);

    let mut hasher = Sha256::new();
    hasher.update(input.catalog.protocol().as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(format!("{:?}", input.catalog.version()).as_bytes());
    hasher.update([0u8]);
    match input.authoritative_index {
        Some(index) => hasher.update(index.to_le_bytes()),
        None => hasher.update(b"none"),
    }
    for cycle in cycles {
        hasher.update([0u8]);
        // Serialising the record cannot fail: every field is plain data.
        match serde_json::to_vec(cycle) {
            Ok(bytes) => hasher.update(&bytes),
            Err(_) => hasher.update(cycle.id.to_string().as_bytes()),
        }
    }
    format!("{:x}", hasher.finalize())
}

/// Bounded memo of resolutions. Cleared wholesale when full.
pub struct ResolutionCache {
    resolver: CurrentStepResolver,
    capacity: usize,
    entries: RwLock<HashMap<String, StepResolution>>,
}

impl ResolutionCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_resolver(CurrentStepResolver::default(), capacity)
    }

    pub fn with_resolver(resolver: CurrentStepResolver, capacity: usize) -> Self {
        Self {
            resolver,
            capacity: capacity.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached resolution for `input`, computing it on a miss.
    pub fn resolve(&self, input: &ResolutionInput<'_>) -> StepResolution {
        let key = content_key(input);

        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            tracing::trace!(key = %key, "Resolution cache hit");
            return hit.clone();
        }

        let resolution = self.resolver.resolve(input);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= self.capacity {
            tracing::debug!(capacity = self.capacity, "Resolution cache full, clearing");
            entries.clear();
        }
        entries.insert(key, resolution.clone());
        resolution
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::StepCatalog;
    use crate::domain::foundation::{CycleStatus, Protocol, TreatmentId};
    use crate::domain::records::TreatmentCycle;

    fn cycles() -> Vec<TreatmentCycle> {
        let t = TreatmentId::new();
        vec![
            TreatmentCycle::new(t, 1)
                .with_status(CycleStatus::Completed)
                .with_step_type("IVF_STIMULATION"),
            TreatmentCycle::new(t, 2)
                .with_status(CycleStatus::InProgress)
                .with_step_type("IVF_OPU"),
        ]
    }

    fn input(cycles: &[TreatmentCycle], index: Option<i64>) -> ResolutionInput<'_> {
        ResolutionInput {
            catalog: StepCatalog::latest(Protocol::Ivf),
            cycles,
            authoritative_index: index,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // content_key
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn key_ignores_cycle_order() {
        let forward = cycles();
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(content_key(&input(&forward, None)), content_key(&input(&backward, None)));
    }

    #[test]
    fn key_changes_with_content() {
        let before = cycles();
        let mut after = before.clone();
        after[1].status = CycleStatus::Completed.into();

        assert_ne!(content_key(&input(&before, None)), content_key(&input(&after, None)));
        assert_ne!(content_key(&input(&before, None)), content_key(&input(&before, Some(0))));
    }

    #[test]
    fn key_distinguishes_protocol() {
        let none: Vec<TreatmentCycle> = Vec::new();
        let ivf = input(&none, Some(1));
        let iui = ResolutionInput {
            catalog: StepCatalog::latest(Protocol::Iui),
            ..ivf
        };
        assert_ne!(content_key(&ivf), content_key(&iui));
    }

    // ───────────────────────────────────────────────────────────────
    // ResolutionCache
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn cached_resolution_matches_direct_resolution() {
        let cache = ResolutionCache::default();
        let cycles = cycles();
        let direct = CurrentStepResolver::default().resolve(&input(&cycles, None));

        assert_eq!(cache.resolve(&input(&cycles, None)), direct);
        assert_eq!(cache.resolve(&input(&cycles, None)), direct);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clears_when_capacity_reached() {
        let cache = ResolutionCache::new(2);
        let cycles = cycles();
        cache.resolve(&input(&cycles, Some(0)));
        cache.resolve(&input(&cycles, Some(1)));
        assert_eq!(cache.len(), 2);

        cache.resolve(&input(&cycles, Some(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn explicit_clear_empties_cache() {
        let cache = ResolutionCache::new(4);
        cache.resolve(&input(&cycles(), None));
        cache.clear();
        assert!(cache.is_empty());
    }
}
