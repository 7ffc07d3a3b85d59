//! # Credential Issuance Service
//!
//! Issuance is split in two so that signing can be retried without ever
//! leaving a half-written batch behind:
//!
//! 1. [`create_order_creds`](CredentialIssuanceService::create_order_creds)
//!    checks the order is paid and writes a `Pending` row.
//! 2. [`sign_order_creds`](CredentialIssuanceService::sign_order_creds)
//!    asks the authority for signatures and returns them without writing.
//!    [`commit_signed_order_creds`](CredentialIssuanceService::commit_signed_order_creds)
//!    then replaces the pending row with the `Signed` row in one write.

use async_trait::async_trait;
use tokenmint_authority::{AuthorityError, SharedAuthority};
use tokenmint_core::{ItemId, OrderId};
use tokenmint_state::{Issuer, OrderCreds, SignedCreds};
use tokenmint_store::SharedDatastore;

use crate::error::IssuanceError;
use crate::registry::IssuerRegistry;

/// Signs the blinded credentials of an order job.
///
/// Implemented by [`CredentialIssuanceService`]; job runners depend on this
/// trait so the signer can be substituted.
#[async_trait]
pub trait OrderWorker: Send + Sync {
    async fn sign_order_creds(
        &self,
        order_id: OrderId,
        issuer: &Issuer,
        blinded_creds: &[String],
    ) -> Result<SignedCreds, IssuanceError>;
}

/// Issues credential batches for paid orders.
#[derive(Clone)]
pub struct CredentialIssuanceService {
    registry: IssuerRegistry,
    authority: SharedAuthority,
    store: SharedDatastore,
}

impl CredentialIssuanceService {
    pub fn new(authority: SharedAuthority, store: SharedDatastore) -> Self {
        let registry = IssuerRegistry::new(authority.clone(), store.clone());
        Self::with_registry(registry, authority, store)
    }

    /// Use a preconfigured registry, e.g. one with a non-default capacity.
    pub fn with_registry(
        registry: IssuerRegistry,
        authority: SharedAuthority,
        store: SharedDatastore,
    ) -> Self {
        Self {
            registry,
            authority,
            store,
        }
    }

    pub fn registry(&self) -> &IssuerRegistry {
        &self.registry
    }

    /// Persist a pending batch of blinded credentials for one order item.
    ///
    /// Refuses orders that are unknown or unpaid before touching the
    /// issuer or writing anything. A pending batch already stored for the
    /// same item is replaced.
    #[tracing::instrument(
        skip_all,
        fields(order_id = %order_id, item_id = %item_id, count = blinded_creds.len())
    )]
    pub async fn create_order_creds(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        blinded_creds: Vec<String>,
    ) -> Result<OrderCreds, IssuanceError> {
        let order = self
            .store
            .get_order(order_id)
            .await
            .map_err(|e| IssuanceError::storage(format!("finding order {order_id}"), e))?
            .ok_or_else(|| {
                tracing::warn!("refusing credentials for unknown order");
                IssuanceError::OrderNotFound { order_id }
            })?;

        if !order.is_paid() {
            tracing::warn!(status = %order.status, "refusing credentials for unpaid order");
            return Err(IssuanceError::OrderNotPaid {
                order_id,
                status: order.status,
            });
        }

        let issuer = self.registry.get_or_create_issuer(&order.merchant_id).await?;

        let creds = OrderCreds::pending(item_id, order_id, issuer.id, blinded_creds);
        self.store
            .insert_order_creds(creds.clone())
            .await
            .map_err(|e| {
                IssuanceError::storage(format!("inserting order creds for item {item_id}"), e)
            })?;

        tracing::info!(issuer_id = %issuer.id, "stored pending order creds");
        Ok(creds)
    }

    /// Obtain signatures for `blinded_creds` from the issuer's scope.
    ///
    /// Writes nothing. The returned batch carries the issuer's current
    /// public key and exactly one signed token per blinded token.
    #[tracing::instrument(
        skip_all,
        fields(order_id = %order_id, issuer = issuer.name(), count = blinded_creds.len())
    )]
    pub async fn sign_order_creds(
        &self,
        order_id: OrderId,
        issuer: &Issuer,
        blinded_creds: &[String],
    ) -> Result<SignedCreds, IssuanceError> {
        let signing_error = |source: AuthorityError| IssuanceError::SigningAuthority {
            order_id,
            issuer: issuer.name().to_string(),
            source,
        };

        let resp = self
            .authority
            .sign_credentials(issuer.name(), blinded_creds)
            .await
            .map_err(signing_error)?;

        let signed_count = resp.signed_tokens.len();
        let signed = SignedCreds::new(
            blinded_creds.to_vec(),
            resp.signed_tokens,
            resp.batch_proof,
            issuer.public_key.clone(),
        )
        .map_err(|_| {
            signing_error(AuthorityError::BatchSizeMismatch {
                name: issuer.name().to_string(),
                blinded: blinded_creds.len(),
                signed: signed_count,
            })
        })?;

        tracing::info!("signed order creds");
        Ok(signed)
    }

    /// Replace the pending row for (`order_id`, `item_id`) with its signed
    /// successor in a single write.
    #[tracing::instrument(skip_all, fields(order_id = %order_id, item_id = %item_id))]
    pub async fn commit_signed_order_creds(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        signed: SignedCreds,
    ) -> Result<OrderCreds, IssuanceError> {
        let pending = self
            .get_order_creds(order_id)
            .await?
            .into_iter()
            .find(|c| c.id == item_id)
            .ok_or(IssuanceError::OrderCredsNotFound { order_id, item_id })?;

        let creds = pending
            .into_signed(signed)
            .map_err(|source| IssuanceError::InvalidTransition {
                order_id,
                item_id,
                source,
            })?;

        self.store
            .update_order_creds(creds.clone())
            .await
            .map_err(|e| {
                IssuanceError::storage(format!("committing signed creds for item {item_id}"), e)
            })?;

        tracing::info!("committed signed order creds");
        Ok(creds)
    }

    /// All credential batches of an order, pending and signed.
    pub async fn get_order_creds(&self, order_id: OrderId) -> Result<Vec<OrderCreds>, IssuanceError> {
        self.store
            .get_order_creds(order_id)
            .await
            .map_err(|e| IssuanceError::storage(format!("loading creds for order {order_id}"), e))
    }
}

#[async_trait]
impl OrderWorker for CredentialIssuanceService {
    async fn sign_order_creds(
        &self,
        order_id: OrderId,
        issuer: &Issuer,
        blinded_creds: &[String],
    ) -> Result<SignedCreds, IssuanceError> {
        CredentialIssuanceService::sign_order_creds(self, order_id, issuer, blinded_creds).await
    }
}
