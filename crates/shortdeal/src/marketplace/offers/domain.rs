use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for offers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(pub String);

/// Identifier wrapper for listed content items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub String);

/// Currencies a buyer may denominate an offer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Krw,
    Eur,
    Jpy,
}

impl Currency {
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Krw => "KRW",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
        }
    }
}

/// Publication state of a content listing. Offers are only accepted
/// against public listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Public,
    Deleted,
}

/// Party fields that flow into offers and letter-of-intent snapshots.
/// Company and country are optional until onboarding completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyProfile {
    pub handle: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl PartyProfile {
    /// Company name with the account handle as fallback.
    pub fn company_label(&self) -> String {
        self.company_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.handle.clone())
    }

    pub fn country_label(&self) -> String {
        self.country
            .clone()
            .filter(|country| !country.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Snapshot of the listing an offer targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentListing {
    pub content_id: ContentId,
    pub producer: PartyProfile,
    pub title: String,
    pub description: String,
    pub status: ContentStatus,
}

pub const DEFAULT_VALIDITY_DAYS: u32 = 7;

fn default_validity_days() -> u32 {
    DEFAULT_VALIDITY_DAYS
}

/// Buyer-submitted offer payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRequest {
    pub content: ContentListing,
    pub buyer: PartyProfile,
    pub offered_price: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,
}

/// Lifecycle states of an offer. Accepted, rejected, and expired are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl OfferStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
            OfferStatus::Expired => "expired",
        }
    }
}
