use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Trait describing outbound notification hooks (e-mail adapters and the
/// like). Publishing happens after the primary transaction; failures are
/// logged by callers and never abort an offer transition.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Notification payload so routes and tests can assert integration
/// boundaries without a mail transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub template: String,
    pub recipients: Vec<String>,
    pub details: BTreeMap<String, String>,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
