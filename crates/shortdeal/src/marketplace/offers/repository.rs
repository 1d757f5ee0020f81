use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{ContentId, ContentListing, Currency, OfferId, OfferStatus, PartyProfile};

/// Repository record for a stored offer. `expires_at` is fixed at creation
/// and never recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRecord {
    pub id: OfferId,
    pub content: ContentListing,
    pub buyer: PartyProfile,
    pub offered_price: Decimal,
    pub currency: Currency,
    pub message: Option<String>,
    pub status: OfferStatus,
    pub validity_days: u32,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub producer_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OfferRecord {
    pub fn is_pending(&self) -> bool {
        self.status == OfferStatus::Pending
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn view(&self, now: DateTime<Utc>) -> OfferView {
        OfferView {
            id: self.id.clone(),
            content_id: self.content.content_id.clone(),
            content_title: self.content.title.clone(),
            producer: self.content.producer.company_label(),
            buyer: self.buyer.handle.clone(),
            offered_price: self.offered_price,
            currency: self.currency,
            message: self.message.clone(),
            status: self.status.label(),
            validity_days: self.validity_days,
            expires_at: self.expires_at,
            is_expired: self.is_expired(now),
            responded_at: self.responded_at,
            producer_response: self.producer_response.clone(),
            created_at: self.created_at,
        }
    }
}

/// Fields the service hands to the repository; the id is assigned on
/// insert so storage owns identifier uniqueness.
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub content: ContentListing,
    pub buyer: PartyProfile,
    pub offered_price: Decimal,
    pub currency: Currency,
    pub message: Option<String>,
    pub validity_days: u32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction so the offer service can be exercised in isolation.
pub trait OfferRepository: Send + Sync {
    /// Insert a new pending offer. Implementations must refuse the insert
    /// with [`RepositoryError::Conflict`] while another pending offer
    /// exists for the same (content, buyer) pair.
    fn insert(&self, offer: NewOffer) -> Result<OfferRecord, RepositoryError>;
    /// Replace a stored record. Implementations must compare the stored
    /// status against `expected` inside the critical section and refuse
    /// the write with [`RepositoryError::Conflict`] when they differ, so
    /// two responders racing on the same pending offer cannot both win.
    fn update(&self, record: OfferRecord, expected: OfferStatus)
        -> Result<(), RepositoryError>;
    fn fetch(&self, id: &OfferId) -> Result<Option<OfferRecord>, RepositoryError>;
    fn list(&self, filter: &OfferFilter) -> Result<Vec<OfferRecord>, RepositoryError>;
    /// Pending offers whose expiry timestamp is in the past.
    fn expired_pending(&self, now: DateTime<Utc>) -> Result<Vec<OfferRecord>, RepositoryError>;
}

/// Listing filter matching the query parameters of the offers endpoint.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OfferFilter {
    #[serde(default)]
    pub buyer: Option<String>,
    #[serde(default)]
    pub producer: Option<String>,
    #[serde(default)]
    pub status: Option<OfferStatus>,
}

impl OfferFilter {
    pub fn matches(&self, record: &OfferRecord) -> bool {
        if let Some(buyer) = &self.buyer {
            if record.buyer.handle != *buyer {
                return false;
            }
        }
        if let Some(producer) = &self.producer {
            if record.content.producer.handle != *producer {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        true
    }
}

/// Error enumeration for repository failures, shared with the letter of
/// intent store.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("a conflicting record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized offer representation returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct OfferView {
    pub id: OfferId,
    pub content_id: ContentId,
    pub content_title: String,
    pub producer: String,
    pub buyer: String,
    pub offered_price: Decimal,
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: &'static str,
    pub validity_days: u32,
    pub expires_at: DateTime<Utc>,
    pub is_expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer_response: Option<String>,
    pub created_at: DateTime<Utc>,
}
