//! # tokenmint-state — Domain Records and Credential Lifecycle
//!
//! - **Issuer** (`issuer.rs`): one signing scope per merchant. Immutable
//!   once created.
//! - **Order** (`order.rs`): the slice of an order this crate graph needs,
//!   its merchant and whether it has been paid.
//! - **OrderCreds** (`order_creds.rs`): a batch of blinded credentials for
//!   one order item, `Pending` until the authority signs it, then `Signed`.
//!
//! ## Design
//!
//! The signed half of a batch (signed tokens, batch proof, public key
//! snapshot) only exists inside `CredentialState::Signed`, together with the
//! blinded tokens it answers. There is no way to construct a batch that has
//! a proof but no signatures, or signatures of the wrong length.

pub mod issuer;
pub mod order;
pub mod order_creds;

pub use issuer::Issuer;
pub use order::{Order, OrderStatus};
pub use order_creds::{CredentialState, OrderCreds, SignedCreds, StateError};
