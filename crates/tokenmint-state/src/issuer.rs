//! # Issuer
//!
//! A persisted signing scope. The scope's name at the signing authority is
//! the merchant id, so at most one issuer exists per merchant.

use serde::{Deserialize, Serialize};
use tokenmint_core::{IssuerId, MerchantId, PublicKey, Timestamp};

/// A per-merchant signing scope as stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    /// Storage identity.
    pub id: IssuerId,
    /// When the scope was first persisted.
    pub created_at: Timestamp,
    /// Owning merchant. Unique across issuers.
    pub merchant_id: MerchantId,
    /// Verification key published by the signing authority for this scope.
    pub public_key: PublicKey,
}

impl Issuer {
    /// A fresh issuer record with a new id, stamped now.
    pub fn new(merchant_id: MerchantId, public_key: PublicKey) -> Self {
        Self {
            id: IssuerId::new(),
            created_at: Timestamp::now(),
            merchant_id,
            public_key,
        }
    }

    /// Name of the scope as known by the signing authority.
    pub fn name(&self) -> &str {
        self.merchant_id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_merchant_id() {
        let issuer = Issuer::new(MerchantId::new("M1").unwrap(), PublicKey::new("k1"));
        assert_eq!(issuer.name(), "M1");
    }

    #[test]
    fn new_issuers_get_distinct_ids() {
        let m = MerchantId::new("M1").unwrap();
        let a = Issuer::new(m.clone(), PublicKey::new("k1"));
        let b = Issuer::new(m, PublicKey::new("k1"));
        assert_ne!(a.id, b.id);
    }
}
