//! # Issuance Errors
//!
//! | Variant | Disposition |
//! |---------|-------------|
//! | `OrderNotFound`, `OrderNotPaid`, `OrderCredsNotFound` | client error |
//! | `IssuerNotFound`, `InvalidBinding` | client error, whole redemption batch rejected |
//! | `ExternalAuthority`, `SigningAuthority`, `Storage` | server error, retryable by caller |
//! | `InvalidTransition` | conflict with the stored batch |

use thiserror::Error;
use tokenmint_authority::AuthorityError;
use tokenmint_core::{CoreError, ItemId, MerchantId, OrderId, PublicKey};
use tokenmint_state::{OrderStatus, StateError};
use tokenmint_store::StoreError;

/// Errors returned by issuance and redemption operations.
#[derive(Error, Debug)]
pub enum IssuanceError {
    #[error("order {order_id} not found")]
    OrderNotFound { order_id: OrderId },

    /// Credentials are only issued once payment has settled.
    #[error("order {order_id} has not been paid (status {status})")]
    OrderNotPaid {
        order_id: OrderId,
        status: OrderStatus,
    },

    /// No credential batch was submitted for this order item.
    #[error("no credentials stored for order {order_id} item {item_id}")]
    OrderCredsNotFound { order_id: OrderId, item_id: ItemId },

    /// Registering or reading the merchant's signing scope failed.
    #[error("signing authority failed to {operation} issuer for merchant {merchant_id}: {source}")]
    ExternalAuthority {
        merchant_id: MerchantId,
        operation: &'static str,
        #[source]
        source: AuthorityError,
    },

    /// Signing a credential batch failed.
    #[error("signing authority failed to sign credentials for order {order_id} with issuer {issuer}: {source}")]
    SigningAuthority {
        order_id: OrderId,
        issuer: String,
        #[source]
        source: AuthorityError,
    },

    #[error("storage error while {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: StoreError,
    },

    /// A submitted credential names a key no local issuer publishes.
    #[error("no issuer found for public key {public_key}")]
    IssuerNotFound { public_key: PublicKey },

    #[error("credential binding {index} is malformed: {source}")]
    InvalidBinding {
        index: usize,
        #[source]
        source: CoreError,
    },

    #[error("cannot commit signed credentials for order {order_id} item {item_id}: {source}")]
    InvalidTransition {
        order_id: OrderId,
        item_id: ItemId,
        #[source]
        source: StateError,
    },
}

impl IssuanceError {
    pub(crate) fn storage(context: impl Into<String>, source: StoreError) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// Whether the caller sent a request that can never succeed as is.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::OrderNotFound { .. }
                | Self::OrderNotPaid { .. }
                | Self::OrderCredsNotFound { .. }
                | Self::IssuerNotFound { .. }
                | Self::InvalidBinding { .. }
        )
    }

    /// Whether the same call may succeed if repeated later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExternalAuthority { .. } | Self::SigningAuthority { .. } | Self::Storage { .. }
        )
    }
}
