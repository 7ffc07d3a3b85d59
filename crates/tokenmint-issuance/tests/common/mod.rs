//! Shared fixtures: a datastore wrapper that counts and fails on demand,
//! and an authority that returns short batches.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokenmint_authority::{
    AuthorityError, IssuerResponse, MockSigningAuthority, SignCredentialsResponse,
    SigningAuthority,
};
use tokenmint_core::{MerchantId, OrderId, PublicKey};
use tokenmint_issuance::{CredentialIssuanceService, RedemptionRequestBuilder};
use tokenmint_state::{Issuer, Order, OrderCreds, OrderStatus};
use tokenmint_store::{Datastore, MemoryStore, StoreError};

/// Wraps [`MemoryStore`], counting calls and injecting failures.
#[derive(Debug, Default)]
pub struct InstrumentedStore {
    pub inner: MemoryStore,
    key_lookups: DashMap<PublicKey, usize>,
    pub order_creds_writes: AtomicUsize,
    /// `get_issuer` reports "absent" this many more times.
    pub hide_issuers: AtomicUsize,
    pub fail_creds_insert: AtomicBool,
    pub fail_key_lookup: AtomicBool,
}

impl InstrumentedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn key_lookups(&self, key: &str) -> usize {
        self.key_lookups
            .get(&PublicKey::new(key))
            .map(|r| *r.value())
            .unwrap_or(0)
    }

    pub fn total_key_lookups(&self) -> usize {
        self.key_lookups.iter().map(|r| *r.value()).sum()
    }

    pub fn writes(&self) -> usize {
        self.order_creds_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Datastore for InstrumentedStore {
    async fn get_issuer(&self, merchant_id: &MerchantId) -> Result<Option<Issuer>, StoreError> {
        let hidden = self
            .hide_issuers
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if hidden {
            return Ok(None);
        }
        self.inner.get_issuer(merchant_id).await
    }

    async fn insert_issuer(&self, issuer: Issuer) -> Result<Issuer, StoreError> {
        self.inner.insert_issuer(issuer).await
    }

    async fn get_issuer_by_public_key(
        &self,
        public_key: &PublicKey,
    ) -> Result<Option<Issuer>, StoreError> {
        *self.key_lookups.entry(public_key.clone()).or_insert(0) += 1;
        if self.fail_key_lookup.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("replica unavailable".into()));
        }
        self.inner.get_issuer_by_public_key(public_key).await
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        self.inner.get_order(order_id).await
    }

    async fn insert_order(&self, order: Order) -> Result<(), StoreError> {
        self.inner.insert_order(order).await
    }

    async fn insert_order_creds(&self, creds: OrderCreds) -> Result<(), StoreError> {
        if self.fail_creds_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection reset".into()));
        }
        self.order_creds_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_order_creds(creds).await
    }

    async fn update_order_creds(&self, creds: OrderCreds) -> Result<(), StoreError> {
        self.order_creds_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_order_creds(creds).await
    }

    async fn get_order_creds(&self, order_id: OrderId) -> Result<Vec<OrderCreds>, StoreError> {
        self.inner.get_order_creds(order_id).await
    }
}

/// Registers and reads scopes like the mock, but drops the last signature
/// of every batch.
#[derive(Debug, Default)]
pub struct ShortBatchAuthority {
    pub inner: MockSigningAuthority,
}

#[async_trait]
impl SigningAuthority for ShortBatchAuthority {
    async fn create_issuer(&self, name: &str, max_tokens: u64) -> Result<(), AuthorityError> {
        self.inner.create_issuer(name, max_tokens).await
    }

    async fn get_issuer(&self, name: &str) -> Result<IssuerResponse, AuthorityError> {
        self.inner.get_issuer(name).await
    }

    async fn sign_credentials(
        &self,
        name: &str,
        blinded_tokens: &[String],
    ) -> Result<SignCredentialsResponse, AuthorityError> {
        let mut resp = self.inner.sign_credentials(name, blinded_tokens).await?;
        resp.signed_tokens.pop();
        Ok(resp)
    }
}

/// Registers scopes like the mock, but every key read-back fails.
#[derive(Debug, Default)]
pub struct KeyFetchFailingAuthority {
    pub inner: MockSigningAuthority,
}

#[async_trait]
impl SigningAuthority for KeyFetchFailingAuthority {
    async fn create_issuer(&self, name: &str, max_tokens: u64) -> Result<(), AuthorityError> {
        self.inner.create_issuer(name, max_tokens).await
    }

    async fn get_issuer(&self, _name: &str) -> Result<IssuerResponse, AuthorityError> {
        Err(AuthorityError::Unavailable("key endpoint offline".into()))
    }

    async fn sign_credentials(
        &self,
        name: &str,
        blinded_tokens: &[String],
    ) -> Result<SignCredentialsResponse, AuthorityError> {
        self.inner.sign_credentials(name, blinded_tokens).await
    }
}

pub struct Harness {
    pub authority: Arc<MockSigningAuthority>,
    pub store: Arc<InstrumentedStore>,
    pub service: CredentialIssuanceService,
    pub redemptions: RedemptionRequestBuilder,
}

pub fn harness() -> Harness {
    let authority = Arc::new(MockSigningAuthority::new());
    let store = InstrumentedStore::new();
    let service = CredentialIssuanceService::new(authority.clone(), store.clone());
    let redemptions = RedemptionRequestBuilder::new(store.clone());
    Harness {
        authority,
        store,
        service,
        redemptions,
    }
}

pub fn merchant(id: &str) -> MerchantId {
    MerchantId::new(id).unwrap()
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Store an order for `merchant_id` in `status` and return its id.
pub async fn seed_order(store: &InstrumentedStore, merchant_id: &str, status: OrderStatus) -> OrderId {
    let order = Order::new(merchant(merchant_id), status);
    let id = order.id;
    store.insert_order(order).await.unwrap();
    id
}
