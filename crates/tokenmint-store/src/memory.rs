//! In-memory storage backend using DashMap.
//!
//! Issuers are keyed by merchant id, with a secondary index from public key
//! to merchant. Credential batches are keyed by (order, item). Writes hold
//! the `entry()` guard of the row they target, which is what makes the
//! uniqueness and single-row-replacement guarantees hold under concurrency.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokenmint_core::{ItemId, MerchantId, OrderId, PublicKey};
use tokenmint_state::{Issuer, Order, OrderCreds};

use crate::{Datastore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    issuers: DashMap<MerchantId, Issuer>,
    issuer_keys: DashMap<PublicKey, MerchantId>,
    orders: DashMap<OrderId, Order>,
    order_creds: DashMap<(OrderId, ItemId), OrderCreds>,
}

/// Shared in-memory datastore.
///
/// Cheaply cloneable via `Arc`; all clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted issuers.
    pub fn issuer_count(&self) -> usize {
        self.inner.issuers.len()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn get_issuer(&self, merchant_id: &MerchantId) -> Result<Option<Issuer>, StoreError> {
        Ok(self.inner.issuers.get(merchant_id).map(|r| r.value().clone()))
    }

    async fn insert_issuer(&self, issuer: Issuer) -> Result<Issuer, StoreError> {
        match self.inner.issuers.entry(issuer.merchant_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict {
                entity: "issuer",
                key: issuer.merchant_id.to_string(),
            }),
            Entry::Vacant(slot) => {
                // Lock order is issuers then issuer_keys; nothing takes them
                // the other way round.
                match self.inner.issuer_keys.entry(issuer.public_key.clone()) {
                    Entry::Occupied(_) => {
                        return Err(StoreError::Conflict {
                            entity: "issuer_key",
                            key: issuer.public_key.to_string(),
                        })
                    }
                    Entry::Vacant(key_slot) => {
                        key_slot.insert(issuer.merchant_id.clone());
                    }
                }
                slot.insert(issuer.clone());
                tracing::debug!(merchant_id = %issuer.merchant_id, issuer_id = %issuer.id, "issuer stored");
                Ok(issuer)
            }
        }
    }

    async fn get_issuer_by_public_key(
        &self,
        public_key: &PublicKey,
    ) -> Result<Option<Issuer>, StoreError> {
        let merchant = match self.inner.issuer_keys.get(public_key) {
            Some(r) => r.value().clone(),
            None => return Ok(None),
        };
        Ok(self.inner.issuers.get(&merchant).map(|r| r.value().clone()))
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.inner.orders.get(&order_id).map(|r| r.value().clone()))
    }

    async fn insert_order(&self, order: Order) -> Result<(), StoreError> {
        match self.inner.orders.entry(order.id) {
            Entry::Occupied(_) => Err(StoreError::Conflict {
                entity: "order",
                key: order.id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(order);
                Ok(())
            }
        }
    }

    async fn insert_order_creds(&self, creds: OrderCreds) -> Result<(), StoreError> {
        match self.inner.order_creds.entry((creds.order_id, creds.id)) {
            Entry::Occupied(existing) if existing.get().is_signed() => Err(StoreError::Conflict {
                entity: "order_creds",
                key: creds.id.to_string(),
            }),
            Entry::Occupied(mut existing) => {
                existing.insert(creds);
                Ok(())
            }
            Entry::Vacant(slot) => {
                slot.insert(creds);
                Ok(())
            }
        }
    }

    async fn update_order_creds(&self, creds: OrderCreds) -> Result<(), StoreError> {
        match self.inner.order_creds.entry((creds.order_id, creds.id)) {
            Entry::Vacant(_) => Err(StoreError::NotFound {
                entity: "order_creds",
                key: creds.id.to_string(),
            }),
            Entry::Occupied(existing) if existing.get().is_signed() => Err(StoreError::Conflict {
                entity: "order_creds",
                key: creds.id.to_string(),
            }),
            Entry::Occupied(mut existing) => {
                existing.insert(creds);
                Ok(())
            }
        }
    }

    async fn get_order_creds(&self, order_id: OrderId) -> Result<Vec<OrderCreds>, StoreError> {
        let mut creds: Vec<OrderCreds> = self
            .inner
            .order_creds
            .iter()
            .filter(|r| r.key().0 == order_id)
            .map(|r| r.value().clone())
            .collect();
        creds.sort_by_key(|c| c.id);
        Ok(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenmint_core::IssuerId;
    use tokenmint_state::{OrderStatus, SignedCreds};

    fn merchant(id: &str) -> MerchantId {
        MerchantId::new(id).unwrap()
    }

    fn blinded() -> Vec<String> {
        vec!["b1".into(), "b2".into()]
    }

    fn signed_batch() -> SignedCreds {
        SignedCreds::new(blinded(), vec!["s1".into(), "s2".into()], "p".into(), "k1".into()).unwrap()
    }

    #[tokio::test]
    async fn insert_and_get_issuer_by_merchant_and_key() {
        let store = MemoryStore::new();
        let issuer = Issuer::new(merchant("M1"), PublicKey::new("k1"));
        store.insert_issuer(issuer.clone()).await.unwrap();

        assert_eq!(store.get_issuer(&merchant("M1")).await.unwrap(), Some(issuer.clone()));
        assert_eq!(
            store.get_issuer_by_public_key(&PublicKey::new("k1")).await.unwrap(),
            Some(issuer)
        );
        assert_eq!(store.get_issuer(&merchant("M2")).await.unwrap(), None);
        assert_eq!(
            store.get_issuer_by_public_key(&PublicKey::new("k2")).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn second_issuer_for_merchant_conflicts() {
        let store = MemoryStore::new();
        store
            .insert_issuer(Issuer::new(merchant("M1"), PublicKey::new("k1")))
            .await
            .unwrap();
        let err = store
            .insert_issuer(Issuer::new(merchant("M1"), PublicKey::new("k1")))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.issuer_count(), 1);
    }

    #[tokio::test]
    async fn public_key_of_another_merchant_conflicts() {
        let store = MemoryStore::new();
        let first = Issuer::new(merchant("A"), PublicKey::new("k"));
        store.insert_issuer(first.clone()).await.unwrap();

        let err = store
            .insert_issuer(Issuer::new(merchant("B"), PublicKey::new("k")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { entity: "issuer_key", .. }));

        assert_eq!(
            store.get_issuer_by_public_key(&PublicKey::new("k")).await.unwrap(),
            Some(first)
        );
        assert_eq!(store.get_issuer(&merchant("B")).await.unwrap(), None);
        assert_eq!(store.issuer_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_issuer_inserts_admit_exactly_one() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_issuer(Issuer::new(merchant("M1"), PublicKey::new("k1")))
                    .await
            }));
        }
        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(e) => assert!(e.is_conflict()),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(store.issuer_count(), 1);
    }

    #[tokio::test]
    async fn pending_creds_are_overwritten_signed_are_not() {
        let store = MemoryStore::new();
        let order = OrderId::new();
        let item = ItemId::new();
        let issuer = IssuerId::new();

        store
            .insert_order_creds(OrderCreds::pending(item, order, issuer, vec!["old".into()]))
            .await
            .unwrap();
        store
            .insert_order_creds(OrderCreds::pending(item, order, issuer, blinded()))
            .await
            .unwrap();
        let rows = store.get_order_creds(order).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].blinded_creds(), ["b1", "b2"]);

        let signed = rows[0].clone().into_signed(signed_batch()).unwrap();
        store.update_order_creds(signed).await.unwrap();

        let err = store
            .insert_order_creds(OrderCreds::pending(item, order, issuer, blinded()))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(store.get_order_creds(order).await.unwrap()[0].is_signed());
    }

    #[tokio::test]
    async fn update_requires_existing_pending_row() {
        let store = MemoryStore::new();
        let creds = OrderCreds::pending(ItemId::new(), OrderId::new(), IssuerId::new(), blinded())
            .into_signed(signed_batch())
            .unwrap();
        let err = store.update_order_creds(creds.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "order_creds", .. }));
    }

    #[tokio::test]
    async fn orders_round_trip_and_reject_duplicates() {
        let store = MemoryStore::new();
        let order = Order::new(merchant("M1"), OrderStatus::Paid);
        store.insert_order(order.clone()).await.unwrap();
        assert_eq!(store.get_order(order.id).await.unwrap(), Some(order.clone()));
        assert!(store.insert_order(order).await.unwrap_err().is_conflict());
        assert_eq!(store.get_order(OrderId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn order_creds_are_scoped_to_their_order() {
        let store = MemoryStore::new();
        let (a, b) = (OrderId::new(), OrderId::new());
        let issuer = IssuerId::new();
        store
            .insert_order_creds(OrderCreds::pending(ItemId::new(), a, issuer, blinded()))
            .await
            .unwrap();
        store
            .insert_order_creds(OrderCreds::pending(ItemId::new(), a, issuer, blinded()))
            .await
            .unwrap();
        store
            .insert_order_creds(OrderCreds::pending(ItemId::new(), b, issuer, blinded()))
            .await
            .unwrap();
        assert_eq!(store.get_order_creds(a).await.unwrap().len(), 2);
        assert_eq!(store.get_order_creds(b).await.unwrap().len(), 1);
    }
}
