use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::marketplace::offers::{Currency, OfferId, PartyProfile};

/// Identifier wrapper for letters of intent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoiId(pub String);

/// Sequential document number, rendered as `LOI-YYYY-NNNN`. Sequences
/// restart at 1 each calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentNumber {
    pub year: i32,
    pub sequence: u32,
}

impl DocumentNumber {
    pub const fn first(year: i32) -> Self {
        Self { year, sequence: 1 }
    }

    pub const fn next(self) -> Self {
        Self {
            year: self.year,
            sequence: self.sequence + 1,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.strip_prefix("LOI-")?;
        let (year, sequence) = rest.split_once('-')?;
        if sequence.len() < 4 {
            return None;
        }
        Some(Self {
            year: year.parse().ok()?,
            sequence: sequence.parse().ok()?,
        })
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LOI-{}-{:04}", self.year, self.sequence)
    }
}

impl Serialize for DocumentNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| D::Error::custom(format!("'{raw}' is not a LOI-YYYY-NNNN number")))
    }
}

/// Party details frozen into the letter at acceptance time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySnapshot {
    pub handle: String,
    pub company: String,
    pub country: String,
}

impl PartySnapshot {
    pub fn from_profile(profile: &PartyProfile) -> Self {
        Self {
            handle: profile.handle.clone(),
            company: profile.company_label(),
            country: profile.country_label(),
        }
    }
}

/// Rendered document artifact attached to a letter of intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Letter of intent: an immutable snapshot of an accepted deal. Only the
/// rendered artifact may be attached after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoiRecord {
    pub id: LoiId,
    pub offer_id: OfferId,
    pub document_number: DocumentNumber,
    pub buyer: PartySnapshot,
    pub producer: PartySnapshot,
    pub content_title: String,
    pub content_description: String,
    pub agreed_price: Decimal,
    pub currency: Currency,
    pub artifact: Option<RenderedDocument>,
    pub rendered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LoiRecord {
    pub fn is_document_ready(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn view(&self) -> LoiView {
        LoiView {
            id: self.id.clone(),
            offer_id: self.offer_id.clone(),
            document_number: self.document_number,
            buyer: self.buyer.clone(),
            producer: self.producer.clone(),
            content_title: self.content_title.clone(),
            agreed_price: self.agreed_price,
            currency: self.currency,
            document_ready: self.is_document_ready(),
            created_at: self.created_at,
        }
    }
}

/// Sanitized letter representation returned by the API; the artifact
/// itself is only served through the download endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LoiView {
    pub id: LoiId,
    pub offer_id: OfferId,
    pub document_number: DocumentNumber,
    pub buyer: PartySnapshot,
    pub producer: PartySnapshot,
    pub content_title: String,
    pub agreed_price: Decimal,
    pub currency: Currency,
    pub document_ready: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_number_renders_zero_padded() {
        let number = DocumentNumber {
            year: 2026,
            sequence: 7,
        };
        assert_eq!(number.to_string(), "LOI-2026-0007");
    }

    #[test]
    fn document_number_round_trips_through_parse() {
        let number = DocumentNumber {
            year: 2026,
            sequence: 1234,
        };
        assert_eq!(DocumentNumber::parse("LOI-2026-1234"), Some(number));
        assert_eq!(DocumentNumber::parse(&number.to_string()), Some(number));
    }

    #[test]
    fn parse_rejects_malformed_numbers() {
        assert_eq!(DocumentNumber::parse("LOI-2026-12"), None);
        assert_eq!(DocumentNumber::parse("DOC-2026-0001"), None);
        assert_eq!(DocumentNumber::parse("LOI-two-0001"), None);
    }

    #[test]
    fn next_increments_within_the_same_year() {
        let first = DocumentNumber::first(2026);
        let second = first.next();
        assert_eq!(second.year, 2026);
        assert_eq!(second.sequence, 2);
        assert!(first < second);
    }

    #[test]
    fn serializes_as_display_string() {
        let number = DocumentNumber::first(2026);
        let encoded = serde_json::to_string(&number).expect("serializes");
        assert_eq!(encoded, "\"LOI-2026-0001\"");
        let decoded: DocumentNumber = serde_json::from_str(&encoded).expect("deserializes");
        assert_eq!(decoded, number);
    }
}
