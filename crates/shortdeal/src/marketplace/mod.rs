//! Marketplace domain: offer negotiation between buyers and producers,
//! letter-of-intent generation for accepted deals, and the response
//! envelope shared by the HTTP surface.

pub mod loi;
pub mod notifications;
pub mod offers;
pub mod response;
