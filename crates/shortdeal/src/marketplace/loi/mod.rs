pub mod domain;
pub mod render;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{DocumentNumber, LoiId, LoiRecord, LoiView, PartySnapshot, RenderedDocument};
pub use render::{FixedLayoutRenderer, LoiRenderer, RenderError};
pub use repository::{LoiRepository, NewLoi};
pub use router::loi_router;
pub use service::{LoiError, LoiService};
