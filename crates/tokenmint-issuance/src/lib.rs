//! # tokenmint-issuance — Credential Issuance and Redemption Assembly
//!
//! Turns a paid order into a batch of blindly signed credentials, and turns
//! client-held credentials back into verification requests.
//!
//! ## Components
//!
//! - [`IssuerRegistry`]: one signing scope per merchant, created on first
//!   use. Concurrent first use is resolved by the datastore's uniqueness
//!   constraint, not by a lock.
//! - [`CredentialIssuanceService`]: refuses unpaid orders, persists pending
//!   batches, obtains signatures, and commits signed batches as one row
//!   write.
//! - [`RedemptionRequestBuilder`]: resolves each submitted credential to its
//!   issuer by public key. All bindings resolve or the whole batch fails.
//!
//! ## Flow
//!
//! ```text
//! paid order ─▶ create_order_creds ─▶ Pending row
//!                                        │
//!              sign_order_creds ◀────────┘   (retryable, writes nothing)
//!                     │
//!                     ▼
//!        commit_signed_order_creds ─▶ Signed row
//! ```
//!
//! Nothing here retries. Every error names the operation and identifier it
//! concerns and is returned to the caller.

pub mod error;
pub mod redemption;
pub mod registry;
pub mod service;

pub use error::IssuanceError;
pub use redemption::{CredentialBinding, RedemptionRequestBuilder};
pub use registry::{IssuerRegistry, DEFAULT_MAX_TOKENS_PER_ISSUER};
pub use service::{CredentialIssuanceService, OrderWorker};
