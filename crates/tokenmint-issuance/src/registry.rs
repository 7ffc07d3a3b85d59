//! # Issuer Registry
//!
//! Creates and looks up the per-merchant signing scope.
//!
//! ## First-use race
//!
//! Two requests for a merchant with no issuer may both miss the lookup and
//! both register a scope and insert a row. Registration is idempotent by
//! name at the authority, and the datastore admits exactly one issuer per
//! merchant. The loser sees [`StoreError::Conflict`](tokenmint_store::StoreError)
//! and returns the winner's row read back from storage, so every caller
//! ends up with the same issuer id and key. No lock is held, which keeps
//! this correct across replicas.

use tokenmint_authority::SharedAuthority;
use tokenmint_core::MerchantId;
use tokenmint_state::Issuer;
use tokenmint_store::SharedDatastore;

use crate::error::IssuanceError;

/// Lifetime token capacity requested for each new signing scope.
pub const DEFAULT_MAX_TOKENS_PER_ISSUER: u64 = 4_000_000;

/// Owns creation and lookup of per-merchant issuers.
#[derive(Clone)]
pub struct IssuerRegistry {
    authority: SharedAuthority,
    store: SharedDatastore,
    max_tokens: u64,
}

impl IssuerRegistry {
    pub fn new(authority: SharedAuthority, store: SharedDatastore) -> Self {
        Self {
            authority,
            store,
            max_tokens: DEFAULT_MAX_TOKENS_PER_ISSUER,
        }
    }

    /// Override the capacity requested for newly created scopes.
    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn max_tokens(&self) -> u64 {
        self.max_tokens
    }

    /// Register a signing scope for `merchant_id`, fetch its key, and
    /// persist the issuer.
    #[tracing::instrument(skip_all, fields(merchant_id = %merchant_id))]
    pub async fn create_issuer(&self, merchant_id: &MerchantId) -> Result<Issuer, IssuanceError> {
        let name = merchant_id.as_str();

        self.authority
            .create_issuer(name, self.max_tokens)
            .await
            .map_err(|source| IssuanceError::ExternalAuthority {
                merchant_id: merchant_id.clone(),
                operation: "register",
                source,
            })?;

        let scope = self
            .authority
            .get_issuer(name)
            .await
            .map_err(|source| IssuanceError::ExternalAuthority {
                merchant_id: merchant_id.clone(),
                operation: "fetch",
                source,
            })?;

        let issuer = self
            .store
            .insert_issuer(Issuer::new(merchant_id.clone(), scope.public_key))
            .await
            .map_err(|e| {
                IssuanceError::storage(format!("inserting issuer for merchant {merchant_id}"), e)
            })?;

        tracing::info!(
            issuer_id = %issuer.id,
            max_tokens = self.max_tokens,
            "created issuer"
        );
        Ok(issuer)
    }

    /// Return the merchant's issuer, creating it on first use.
    #[tracing::instrument(skip_all, fields(merchant_id = %merchant_id))]
    pub async fn get_or_create_issuer(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Issuer, IssuanceError> {
        if let Some(issuer) = self.lookup(merchant_id).await? {
            return Ok(issuer);
        }

        match self.create_issuer(merchant_id).await {
            Err(IssuanceError::Storage { source, .. }) if source.is_conflict() => {
                tracing::warn!("lost issuer creation race, reading back the stored issuer");
                self.lookup(merchant_id).await?.ok_or_else(|| {
                    IssuanceError::storage(
                        format!("reading back issuer for merchant {merchant_id} after conflict"),
                        source,
                    )
                })
            }
            other => other,
        }
    }

    async fn lookup(&self, merchant_id: &MerchantId) -> Result<Option<Issuer>, IssuanceError> {
        self.store
            .get_issuer(merchant_id)
            .await
            .map_err(|e| IssuanceError::storage(format!("finding issuer for merchant {merchant_id}"), e))
    }
}
