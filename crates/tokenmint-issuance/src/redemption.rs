//! # Redemption Request Builder
//!
//! Clients redeem credentials by presenting, for each one, the public key
//! of the scope that signed it, the token preimage, and the signature. The
//! builder maps each key back to its issuer and emits requests for the
//! redemption verifier.
//!
//! ## Guarantees
//!
//! - Output index `i` corresponds to input binding `i`.
//! - Every binding resolves, or the call fails and returns nothing.
//! - Each distinct key is looked up in storage at most once per call. The
//!   cache lives on the stack of one call and is dropped with it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokenmint_authority::CredentialRedemption;
use tokenmint_core::{require_base64, CoreError, PublicKey};
use tokenmint_store::SharedDatastore;

use crate::error::IssuanceError;

/// One credential presented by a client for redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBinding {
    #[serde(rename = "publicKey")]
    pub public_key: PublicKey,
    #[serde(rename = "t")]
    pub token_preimage: String,
    pub signature: String,
}

impl CredentialBinding {
    /// Every field must be non-empty standard base64.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_base64("publicKey", self.public_key.as_str())?;
        require_base64("t", &self.token_preimage)?;
        require_base64("signature", &self.signature)
    }
}

/// Builds redemption requests from client-submitted bindings.
#[derive(Clone)]
pub struct RedemptionRequestBuilder {
    store: SharedDatastore,
}

impl RedemptionRequestBuilder {
    pub fn new(store: SharedDatastore) -> Self {
        Self { store }
    }

    /// Check the wire encoding of every binding before it is accepted.
    ///
    /// Fails on the first malformed binding, naming its index.
    pub fn validate_bindings(bindings: &[CredentialBinding]) -> Result<(), IssuanceError> {
        for (index, binding) in bindings.iter().enumerate() {
            binding
                .validate()
                .map_err(|source| IssuanceError::InvalidBinding { index, source })?;
        }
        Ok(())
    }

    /// Resolve every binding to its issuer and build one redemption per
    /// binding, in input order.
    #[tracing::instrument(skip_all, fields(count = bindings.len()))]
    pub async fn generate_credential_redemptions(
        &self,
        bindings: &[CredentialBinding],
    ) -> Result<Vec<CredentialRedemption>, IssuanceError> {
        let mut issuer_names: HashMap<&PublicKey, String> = HashMap::new();
        let mut redemptions = Vec::with_capacity(bindings.len());

        for binding in bindings {
            let key = &binding.public_key;
            let issuer = match issuer_names.get(key) {
                Some(name) => {
                    tracing::debug!(public_key = %key, "issuer cache hit");
                    name.clone()
                }
                None => {
                    tracing::debug!(public_key = %key, "issuer cache miss");
                    let issuer = self
                        .store
                        .get_issuer_by_public_key(key)
                        .await
                        .map_err(|e| {
                            IssuanceError::storage(format!("finding issuer for public key {key}"), e)
                        })?
                        .ok_or_else(|| IssuanceError::IssuerNotFound {
                            public_key: key.clone(),
                        })?;
                    let name = issuer.name().to_string();
                    issuer_names.insert(key, name.clone());
                    name
                }
            };

            redemptions.push(CredentialRedemption {
                issuer,
                token_preimage: binding.token_preimage.clone(),
                signature: binding.signature.clone(),
            });
        }

        Ok(redemptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_uses_client_wire_names() {
        let binding: CredentialBinding = serde_json::from_value(serde_json::json!({
            "publicKey": "azE=",
            "t": "dDE=",
            "signature": "czE="
        }))
        .unwrap();
        assert_eq!(binding.public_key.as_str(), "azE=");
        assert_eq!(binding.token_preimage, "dDE=");
        assert_eq!(binding.signature, "czE=");
    }

    #[test]
    fn validate_rejects_non_base64_fields() {
        let binding = CredentialBinding {
            public_key: PublicKey::new("azE="),
            token_preimage: "not base64!".into(),
            signature: "czE=".into(),
        };
        assert!(matches!(
            binding.validate(),
            Err(CoreError::InvalidBase64 { field: "t", .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_signature() {
        let binding = CredentialBinding {
            public_key: PublicKey::new("azE="),
            token_preimage: "dDE=".into(),
            signature: String::new(),
        };
        assert_eq!(
            binding.validate(),
            Err(CoreError::Empty { field: "signature" })
        );
    }

    #[test]
    fn validate_bindings_names_first_bad_index() {
        let good = CredentialBinding {
            public_key: PublicKey::new("azE="),
            token_preimage: "dDE=".into(),
            signature: "czE=".into(),
        };
        let bad = CredentialBinding {
            public_key: PublicKey::new("%%%"),
            ..good.clone()
        };
        assert!(RedemptionRequestBuilder::validate_bindings(&[good.clone()]).is_ok());
        let err = RedemptionRequestBuilder::validate_bindings(&[good, bad]).unwrap_err();
        assert!(matches!(err, IssuanceError::InvalidBinding { index: 1, .. }));
        assert!(err.is_client_error());
    }
}
