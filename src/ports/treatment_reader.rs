//! Treatment reader port.

use crate::domain::foundation::{DomainError, TreatmentId};
use crate::domain::records::Treatment;
use async_trait::async_trait;

#[async_trait]
pub trait TreatmentReader: Send + Sync {
    /// Get a treatment by ID.
    ///
    /// Returns `None` if not found.
    async fn get_by_id(&self, id: &TreatmentId) -> Result<Option<Treatment>, DomainError>;
}
