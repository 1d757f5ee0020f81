use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::domain::{DocumentNumber, LoiId, LoiRecord, PartySnapshot, RenderedDocument};
use super::render::{LoiRenderer, RenderError};
use super::repository::{LoiRepository, NewLoi};
use crate::marketplace::offers::{OfferId, OfferRecord, RepositoryError};

/// Service owning letter-of-intent creation and document rendering.
pub struct LoiService<L> {
    repository: Arc<L>,
    renderer: Arc<dyn LoiRenderer>,
}

impl<L> LoiService<L>
where
    L: LoiRepository + 'static,
{
    pub fn new(repository: Arc<L>, renderer: Arc<dyn LoiRenderer>) -> Self {
        Self {
            repository,
            renderer,
        }
    }

    /// Create the letter for an accepted offer. Idempotent: if a letter is
    /// already linked to the offer it is returned unchanged, and the
    /// repository refuses a duplicate insert should two creations race
    /// past the lookup. A rendering failure is logged and leaves the
    /// letter without an artifact; the document can be regenerated later
    /// through [`LoiService::render`].
    pub fn create_from_offer(
        &self,
        offer: &OfferRecord,
        now: DateTime<Utc>,
    ) -> Result<LoiRecord, LoiError> {
        if let Some(existing) = self.repository.find_by_offer(&offer.id)? {
            return Ok(existing);
        }

        let loi = match self.repository.create(NewLoi {
            offer_id: offer.id.clone(),
            buyer: PartySnapshot::from_profile(&offer.buyer),
            producer: PartySnapshot::from_profile(&offer.content.producer),
            content_title: offer.content.title.clone(),
            content_description: offer.content.description.clone(),
            agreed_price: offer.offered_price,
            currency: offer.currency,
            created_at: now,
        }) {
            Ok(loi) => loi,
            // Lost the insert race; the letter that won is the linked one.
            Err(RepositoryError::Conflict) => {
                return self
                    .repository
                    .find_by_offer(&offer.id)?
                    .ok_or(LoiError::NotFound);
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            document = %loi.document_number,
            offer = %offer.id.0,
            "letter of intent created"
        );

        match self.renderer.render(&loi, now) {
            Ok(document) => Ok(self.repository.attach_artifact(&loi.id, document, now)?),
            Err(err) => {
                error!(document = %loi.document_number, %err, "document rendering failed");
                Ok(loi)
            }
        }
    }

    /// Regenerate and attach the document for a letter, e.g. after an
    /// earlier rendering failure.
    pub fn render(&self, id: &LoiId, now: DateTime<Utc>) -> Result<LoiRecord, LoiError> {
        let loi = self.get(id)?;
        let document = self.renderer.render(&loi, now)?;
        Ok(self.repository.attach_artifact(&loi.id, document, now)?)
    }

    pub fn get(&self, id: &LoiId) -> Result<LoiRecord, LoiError> {
        self.repository.fetch(id)?.ok_or(LoiError::NotFound)
    }

    pub fn find_by_offer(&self, offer_id: &OfferId) -> Result<Option<LoiRecord>, LoiError> {
        Ok(self.repository.find_by_offer(offer_id)?)
    }

    pub fn list_for_party(&self, handle: &str) -> Result<Vec<LoiRecord>, LoiError> {
        Ok(self.repository.list_for_party(handle)?)
    }

    /// The rendered document plus its number, for the download endpoint.
    pub fn artifact(&self, id: &LoiId) -> Result<(DocumentNumber, RenderedDocument), LoiError> {
        let loi = self.get(id)?;
        let document = loi.artifact.ok_or(LoiError::ArtifactPending)?;
        Ok((loi.document_number, document))
    }
}

/// Error raised by the letter-of-intent service.
#[derive(Debug, thiserror::Error)]
pub enum LoiError {
    #[error("letter of intent not found")]
    NotFound,
    #[error("the document is still being generated")]
    ArtifactPending,
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
