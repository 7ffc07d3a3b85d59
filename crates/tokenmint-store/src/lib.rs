//! # tokenmint-store — Storage Seam
//!
//! Credential issuance never talks to a database directly. It consumes the
//! [`Datastore`] trait, and every cross-call consistency guarantee it relies
//! on is part of that trait's contract rather than an in-process lock:
//!
//! - `insert_issuer` enforces one issuer per merchant and reports a losing
//!   insert as [`StoreError::Conflict`].
//! - Each write replaces one row atomically. A reader never observes a
//!   credential batch with half of its signed fields present.
//!
//! [`MemoryStore`] implements the contract on `DashMap` for tests and
//! single-process deployments. SQL backends live with the host service.

pub mod error;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use tokenmint_core::{MerchantId, OrderId, PublicKey};
use tokenmint_state::{Issuer, Order, OrderCreds};

pub use error::StoreError;
pub use memory::MemoryStore;

/// Shared handle to a datastore implementation.
pub type SharedDatastore = Arc<dyn Datastore>;

/// Persistence operations required by credential issuance and redemption.
///
/// Implementations must be safe to share across tasks and replicas; all
/// methods are cancel-safe in the sense that dropping the future before it
/// resolves leaves either the old row or the new row, never a mix.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Look up the issuer owned by `merchant_id`.
    async fn get_issuer(&self, merchant_id: &MerchantId) -> Result<Option<Issuer>, StoreError>;

    /// Persist a new issuer. Fails with [`StoreError::Conflict`] if the
    /// merchant already has one, or if another issuer publishes the same
    /// public key.
    async fn insert_issuer(&self, issuer: Issuer) -> Result<Issuer, StoreError>;

    /// Look up the issuer whose scope publishes `public_key`.
    async fn get_issuer_by_public_key(
        &self,
        public_key: &PublicKey,
    ) -> Result<Option<Issuer>, StoreError>;

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError>;

    async fn insert_order(&self, order: Order) -> Result<(), StoreError>;

    /// Write a pending batch keyed by (order, item). A pending row for the
    /// same key is replaced; a signed row is never replaced.
    async fn insert_order_creds(&self, creds: OrderCreds) -> Result<(), StoreError>;

    /// Replace an existing pending row with its signed successor.
    async fn update_order_creds(&self, creds: OrderCreds) -> Result<(), StoreError>;

    /// All batches of an order, ordered by item id.
    async fn get_order_creds(&self, order_id: OrderId) -> Result<Vec<OrderCreds>, StoreError>;
}
