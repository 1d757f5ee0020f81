//! Shortdeal marketplace core: buyers submit price offers on listed
//! content, producers accept or reject them, and an accepted offer yields
//! a letter of intent with a sequential document number.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
