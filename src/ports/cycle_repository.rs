//! Cycle repository port (write side).
//!
//! Mirrors the mutation endpoints of the records API. Every call carries the
//! version the caller last read, if the server supplied one.
//!
//! # Errors
//!
//! - `CycleNotFound` if the cycle doesn't exist
//! - `ConcurrentModification` if `expected_version` is stale
//! - `RemoteUnavailable` on transport failure or 5xx

use crate::domain::foundation::{CycleId, DomainError, Timestamp};
use crate::domain::records::TreatmentCycle;
use async_trait::async_trait;

/// Body of `POST treatment-cycles/{id}/start`.
#[derive(Debug, Clone, PartialEq)]
pub struct StartCycleRequest {
    pub start_date: Timestamp,
    pub expected_version: Option<u64>,
}

/// Body of `POST treatment-cycles/{id}/complete`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteCycleRequest {
    pub end_date: Timestamp,
    pub outcome: Option<String>,
    pub notes: Option<String>,
    pub expected_version: Option<u64>,
}

/// Body of `POST treatment-cycles/{id}/cancel`.
#[derive(Debug, Clone, PartialEq)]
pub struct CancelCycleRequest {
    pub reason: String,
    pub notes: Option<String>,
    pub expected_version: Option<u64>,
}

/// Repository port for cycle mutations. Each method returns the cycle as
/// stored after the change.
#[async_trait]
pub trait CycleRepository: Send + Sync {
    /// General field update (`PUT treatment-cycles/{id}`); the cycle's own
    /// `version` is the expected version.
    async fn update(&self, cycle: &TreatmentCycle) -> Result<TreatmentCycle, DomainError>;

    async fn start(
        &self,
        id: &CycleId,
        request: StartCycleRequest,
    ) -> Result<TreatmentCycle, DomainError>;

    async fn complete(
        &self,
        id: &CycleId,
        request: CompleteCycleRequest,
    ) -> Result<TreatmentCycle, DomainError>;

    async fn cancel(
        &self,
        id: &CycleId,
        request: CancelCycleRequest,
    ) -> Result<TreatmentCycle, DomainError>;
}
