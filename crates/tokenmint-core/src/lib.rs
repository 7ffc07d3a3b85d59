//! # tokenmint-core — Foundational Types
//!
//! The leaf of the tokenmint crate graph. Defines the identifier newtypes
//! shared by every other crate, the UTC-only `Timestamp`, and the base64
//! checks applied to client-submitted credential material.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tokenmint-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod encoding;
pub mod error;
pub mod identity;
pub mod temporal;

pub use encoding::require_base64;
pub use error::CoreError;
pub use identity::{IssuerId, ItemId, MerchantId, OrderId, PublicKey};
pub use temporal::Timestamp;
