use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::domain::{ContentStatus, OfferId, OfferRequest, OfferStatus};
use super::repository::{NewOffer, OfferFilter, OfferRecord, OfferRepository, RepositoryError};
use crate::marketplace::loi::{LoiRecord, LoiRepository, LoiService};
use crate::marketplace::notifications::{Notification, NotificationPublisher};

/// Service owning the offer state machine. Acceptance runs the letter of
/// intent creation as an explicit post-transition step; its failure (and
/// any notification failure) never rolls the accepted status back.
pub struct OfferService<R, L, N> {
    offers: Arc<R>,
    lois: Arc<LoiService<L>>,
    notifications: Arc<N>,
}

impl<R, L, N> OfferService<R, L, N>
where
    R: OfferRepository + 'static,
    L: LoiRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(offers: Arc<R>, lois: Arc<LoiService<L>>, notifications: Arc<N>) -> Self {
        Self {
            offers,
            lois,
            notifications,
        }
    }

    /// Create a pending offer. The expiry timestamp is fixed here and
    /// never recomputed.
    pub fn create(
        &self,
        request: OfferRequest,
        now: DateTime<Utc>,
    ) -> Result<OfferRecord, OfferError> {
        if request.offered_price <= Decimal::ZERO {
            return Err(OfferError::InvalidPrice);
        }
        if request.content.status != ContentStatus::Public {
            return Err(OfferError::ContentUnavailable);
        }
        if request.validity_days == 0 {
            return Err(OfferError::InvalidValidity);
        }

        let record = self
            .offers
            .insert(NewOffer {
                content: request.content,
                buyer: request.buyer,
                offered_price: request.offered_price,
                currency: request.currency,
                message: request.message,
                validity_days: request.validity_days,
                expires_at: now + Duration::days(i64::from(request.validity_days)),
                created_at: now,
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => OfferError::DuplicatePending,
                other => OfferError::Repository(other),
            })?;

        info!(
            offer = %record.id.0,
            content = %record.content.content_id.0,
            buyer = %record.buyer.handle,
            "offer created"
        );
        Ok(record)
    }

    /// Accept a pending, unexpired offer. Returns the updated record and
    /// the linked letter of intent, or `None` for the letter when its
    /// creation failed and will be retried out of band.
    pub fn accept(
        &self,
        id: &OfferId,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(OfferRecord, Option<LoiRecord>), OfferError> {
        let record = self.respond(id, OfferStatus::Accepted, note, now)?;

        let loi = match self.lois.create_from_offer(&record, now) {
            Ok(loi) => Some(loi),
            Err(err) => {
                error!(offer = %record.id.0, %err, "letter of intent creation failed");
                None
            }
        };

        self.notify(&record, "offer_accepted", loi.as_ref());
        Ok((record, loi))
    }

    /// Reject a pending offer.
    pub fn reject(
        &self,
        id: &OfferId,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<OfferRecord, OfferError> {
        let record = self.respond(id, OfferStatus::Rejected, note, now)?;
        self.notify(&record, "offer_rejected", None);
        Ok(record)
    }

    fn respond(
        &self,
        id: &OfferId,
        next: OfferStatus,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<OfferRecord, OfferError> {
        let mut record = self.get(id)?;
        if !record.is_pending() {
            return Err(OfferError::InvalidTransition {
                status: record.status,
            });
        }
        if next == OfferStatus::Accepted && record.is_expired(now) {
            return Err(OfferError::Expired);
        }

        record.status = next;
        record.responded_at = Some(now);
        record.producer_response = note;
        record.updated_at = now;
        match self.offers.update(record.clone(), OfferStatus::Pending) {
            Ok(()) => {}
            // Someone else resolved the offer between the fetch and the
            // write; report the status they left behind.
            Err(RepositoryError::Conflict) => {
                let current = self.get(id)?;
                return Err(OfferError::InvalidTransition {
                    status: current.status,
                });
            }
            Err(other) => return Err(other.into()),
        }

        info!(offer = %record.id.0, status = record.status.label(), "offer responded");
        Ok(record)
    }

    pub fn get(&self, id: &OfferId) -> Result<OfferRecord, OfferError> {
        self.offers.fetch(id)?.ok_or(OfferError::NotFound)
    }

    pub fn list(&self, filter: &OfferFilter) -> Result<Vec<OfferRecord>, OfferError> {
        Ok(self.offers.list(filter)?)
    }

    /// Move pending offers past their expiry to the terminal expired
    /// status; returns how many were swept.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, OfferError> {
        let stale = self.offers.expired_pending(now)?;
        let mut swept = 0;
        for mut record in stale {
            record.status = OfferStatus::Expired;
            record.updated_at = now;
            match self.offers.update(record, OfferStatus::Pending) {
                Ok(()) => swept += 1,
                // Resolved between the scan and the write; leave it alone.
                Err(RepositoryError::Conflict) => {}
                Err(other) => return Err(other.into()),
            }
        }
        if swept > 0 {
            info!(swept, "expired pending offers swept");
        }
        Ok(swept)
    }

    fn notify(&self, record: &OfferRecord, template: &str, loi: Option<&LoiRecord>) {
        let mut details = BTreeMap::new();
        details.insert("offer_id".to_string(), record.id.0.clone());
        details.insert(
            "content_title".to_string(),
            record.content.title.clone(),
        );
        if let Some(loi) = loi {
            details.insert(
                "document_number".to_string(),
                loi.document_number.to_string(),
            );
        }

        let notification = Notification {
            template: template.to_string(),
            recipients: vec![
                record.buyer.handle.clone(),
                record.content.producer.handle.clone(),
            ],
            details,
        };

        if let Err(err) = self.notifications.publish(notification) {
            warn!(offer = %record.id.0, %err, "notification dispatch failed");
        }
    }
}

/// Error raised by the offer service.
#[derive(Debug, thiserror::Error)]
pub enum OfferError {
    #[error("offered price must be greater than 0")]
    InvalidPrice,
    #[error("cannot make an offer on non-public content")]
    ContentUnavailable,
    #[error("validity days must be greater than 0")]
    InvalidValidity,
    #[error("a pending offer already exists for this content")]
    DuplicatePending,
    #[error("cannot respond to an offer with status: {}", status.label())]
    InvalidTransition { status: OfferStatus },
    #[error("cannot accept an expired offer")]
    Expired,
    #[error("offer not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
