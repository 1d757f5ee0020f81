use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use shortdeal::marketplace::loi::{
    DocumentNumber, LoiId, LoiRecord, LoiRepository, NewLoi, RenderedDocument,
};
use shortdeal::marketplace::notifications::{
    Notification, NotificationError, NotificationPublisher,
};
use shortdeal::marketplace::offers::{
    NewOffer, OfferFilter, OfferId, OfferRecord, OfferRepository, OfferStatus, RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryOfferRepository {
    inner: Arc<Mutex<OfferStore>>,
}

#[derive(Default)]
struct OfferStore {
    records: HashMap<OfferId, OfferRecord>,
    sequence: u64,
}

impl OfferRepository for InMemoryOfferRepository {
    fn insert(&self, offer: NewOffer) -> Result<OfferRecord, RepositoryError> {
        let mut store = self.inner.lock().expect("offer store poisoned");
        let duplicate = store.records.values().any(|record| {
            record.is_pending()
                && record.content.content_id == offer.content.content_id
                && record.buyer.handle == offer.buyer.handle
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        store.sequence += 1;
        let id = OfferId(format!("offer-{:06}", store.sequence));
        let record = OfferRecord {
            id: id.clone(),
            content: offer.content,
            buyer: offer.buyer,
            offered_price: offer.offered_price,
            currency: offer.currency,
            message: offer.message,
            status: OfferStatus::Pending,
            validity_days: offer.validity_days,
            expires_at: offer.expires_at,
            responded_at: None,
            producer_response: None,
            created_at: offer.created_at,
            updated_at: offer.created_at,
        };
        store.records.insert(id, record.clone());
        Ok(record)
    }

    fn update(
        &self,
        record: OfferRecord,
        expected: OfferStatus,
    ) -> Result<(), RepositoryError> {
        let mut store = self.inner.lock().expect("offer store poisoned");
        let current = store.records.get(&record.id).ok_or(RepositoryError::NotFound)?;
        if current.status != expected {
            return Err(RepositoryError::Conflict);
        }
        store.records.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &OfferId) -> Result<Option<OfferRecord>, RepositoryError> {
        let store = self.inner.lock().expect("offer store poisoned");
        Ok(store.records.get(id).cloned())
    }

    fn list(&self, filter: &OfferFilter) -> Result<Vec<OfferRecord>, RepositoryError> {
        let store = self.inner.lock().expect("offer store poisoned");
        let mut records: Vec<_> = store
            .records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    fn expired_pending(&self, now: DateTime<Utc>) -> Result<Vec<OfferRecord>, RepositoryError> {
        let store = self.inner.lock().expect("offer store poisoned");
        Ok(store
            .records
            .values()
            .filter(|record| record.is_pending() && record.is_expired(now))
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLoiRepository {
    inner: Arc<Mutex<LoiStore>>,
}

#[derive(Default)]
struct LoiStore {
    records: HashMap<LoiId, LoiRecord>,
    sequence: u64,
}

impl LoiRepository for InMemoryLoiRepository {
    fn create(&self, loi: NewLoi) -> Result<LoiRecord, RepositoryError> {
        // Document number allocation, the one-letter-per-offer check, and
        // the insert share the store lock, so concurrent acceptances can
        // neither draw the same sequence nor link two letters to an offer.
        let mut store = self.inner.lock().expect("loi store poisoned");
        if store
            .records
            .values()
            .any(|record| record.offer_id == loi.offer_id)
        {
            return Err(RepositoryError::Conflict);
        }

        let year = loi.created_at.year();
        let document_number = store
            .records
            .values()
            .map(|record| record.document_number)
            .filter(|number| number.year == year)
            .max()
            .map(DocumentNumber::next)
            .unwrap_or_else(|| DocumentNumber::first(year));

        store.sequence += 1;
        let id = LoiId(format!("loi-{:06}", store.sequence));
        let record = LoiRecord {
            id: id.clone(),
            offer_id: loi.offer_id,
            document_number,
            buyer: loi.buyer,
            producer: loi.producer,
            content_title: loi.content_title,
            content_description: loi.content_description,
            agreed_price: loi.agreed_price,
            currency: loi.currency,
            artifact: None,
            rendered_at: None,
            created_at: loi.created_at,
        };
        store.records.insert(id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &LoiId) -> Result<Option<LoiRecord>, RepositoryError> {
        let store = self.inner.lock().expect("loi store poisoned");
        Ok(store.records.get(id).cloned())
    }

    fn find_by_offer(&self, offer_id: &OfferId) -> Result<Option<LoiRecord>, RepositoryError> {
        let store = self.inner.lock().expect("loi store poisoned");
        Ok(store
            .records
            .values()
            .find(|record| record.offer_id == *offer_id)
            .cloned())
    }

    fn attach_artifact(
        &self,
        id: &LoiId,
        document: RenderedDocument,
        rendered_at: DateTime<Utc>,
    ) -> Result<LoiRecord, RepositoryError> {
        let mut store = self.inner.lock().expect("loi store poisoned");
        let record = store.records.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.artifact = Some(document);
        record.rendered_at = Some(rendered_at);
        Ok(record.clone())
    }

    fn list_for_party(&self, handle: &str) -> Result<Vec<LoiRecord>, RepositoryError> {
        let store = self.inner.lock().expect("loi store poisoned");
        let mut records: Vec<_> = store
            .records
            .values()
            .filter(|record| record.buyer.handle == handle || record.producer.handle == handle)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

/// Publisher standing in for the e-mail transport: records every event
/// and logs it, so demos and tests can assert the integration boundary.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        info!(
            template = %notification.template,
            recipients = notification.recipients.len(),
            "notification published"
        );
        let mut events = self.events.lock().expect("notification log poisoned");
        events.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notification log poisoned").clone()
    }
}
