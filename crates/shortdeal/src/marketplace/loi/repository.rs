use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::domain::{LoiId, LoiRecord, PartySnapshot, RenderedDocument};
use crate::marketplace::offers::{Currency, OfferId, RepositoryError};

/// Snapshot handed to the repository when an accepted offer produces a
/// letter of intent. The document number is not part of the payload: the
/// repository allocates it.
#[derive(Debug, Clone)]
pub struct NewLoi {
    pub offer_id: OfferId,
    pub buyer: PartySnapshot,
    pub producer: PartySnapshot,
    pub content_title: String,
    pub content_description: String,
    pub agreed_price: Decimal,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction for letters of intent.
pub trait LoiRepository: Send + Sync {
    /// Persist a new letter. Implementations must allocate the next
    /// document number for the creation year inside the same critical
    /// section as the insert, so concurrent acceptances can never observe
    /// the same highest sequence, and must refuse a second letter for the
    /// same offer with [`RepositoryError::Conflict`] under that same
    /// section.
    fn create(&self, loi: NewLoi) -> Result<LoiRecord, RepositoryError>;
    fn fetch(&self, id: &LoiId) -> Result<Option<LoiRecord>, RepositoryError>;
    fn find_by_offer(&self, offer_id: &OfferId) -> Result<Option<LoiRecord>, RepositoryError>;
    /// Attach (or replace) the rendered artifact; all snapshot fields stay
    /// untouched.
    fn attach_artifact(
        &self,
        id: &LoiId,
        document: RenderedDocument,
        rendered_at: DateTime<Utc>,
    ) -> Result<LoiRecord, RepositoryError>;
    /// Letters where the handle appears as buyer or producer.
    fn list_for_party(&self, handle: &str) -> Result<Vec<LoiRecord>, RepositoryError>;
}
