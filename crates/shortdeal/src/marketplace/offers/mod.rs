pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ContentId, ContentListing, ContentStatus, Currency, OfferId, OfferRequest, OfferStatus,
    PartyProfile, DEFAULT_VALIDITY_DAYS,
};
pub use repository::{NewOffer, OfferFilter, OfferRecord, OfferRepository, OfferView, RepositoryError};
pub use router::offer_router;
pub use service::{OfferError, OfferService};
