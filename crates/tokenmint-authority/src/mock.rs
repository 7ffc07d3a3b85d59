//! # Mock Signing Authority
//!
//! A deterministic, in-process stand-in for the signing authority. Keys,
//! signatures, and proofs are SHA-256 digests of their inputs, base64
//! encoded. They provide no unlinkability and verify nothing; they exist so
//! issuance and redemption can be exercised end to end without a server.
//!
//! Behaves like the real authority where issuance depends on it:
//! - registration is idempotent by name and never rotates a key,
//! - signing an unknown scope fails with `IssuerUnknown`,
//! - a scope refuses to sign past its token capacity.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokenmint_core::PublicKey;

use crate::error::AuthorityError;
use crate::types::{IssuerResponse, SignCredentialsResponse};
use crate::SigningAuthority;

#[derive(Debug, Clone)]
struct Scope {
    public_key: PublicKey,
    max_tokens: u64,
    signed: u64,
}

/// Deterministic in-memory signing authority.
#[derive(Debug, Default)]
pub struct MockSigningAuthority {
    scopes: DashMap<String, Scope>,
    create_calls: AtomicUsize,
    get_calls: AtomicUsize,
    sign_calls: AtomicUsize,
    registration_down: AtomicBool,
    signing_down: AtomicBool,
}

impl MockSigningAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// The public key this mock assigns to scope `name`.
    pub fn public_key_for(name: &str) -> PublicKey {
        PublicKey::new(digest_b64(&[b"tokenmint-mock-key", name.as_bytes()]))
    }

    /// The signature this mock produces for `blinded` under `public_key`.
    pub fn signature_for(public_key: &PublicKey, blinded: &str) -> String {
        digest_b64(&[b"sig", public_key.as_str().as_bytes(), blinded.as_bytes()])
    }

    /// Make `create_issuer` and `get_issuer` fail with `Unavailable`.
    pub fn set_registration_down(&self, down: bool) {
        self.registration_down.store(down, Ordering::SeqCst);
    }

    /// Make `sign_credentials` fail with `Unavailable`.
    pub fn set_signing_down(&self, down: bool) {
        self.signing_down.store(down, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    /// Number of registered scopes.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

fn digest_b64(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    BASE64.encode(hasher.finalize())
}

#[async_trait]
impl SigningAuthority for MockSigningAuthority {
    async fn create_issuer(&self, name: &str, max_tokens: u64) -> Result<(), AuthorityError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.registration_down.load(Ordering::SeqCst) {
            return Err(AuthorityError::Unavailable("registration offline".into()));
        }
        self.scopes.entry(name.to_string()).or_insert_with(|| Scope {
            public_key: Self::public_key_for(name),
            max_tokens,
            signed: 0,
        });
        Ok(())
    }

    async fn get_issuer(&self, name: &str) -> Result<IssuerResponse, AuthorityError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.registration_down.load(Ordering::SeqCst) {
            return Err(AuthorityError::Unavailable("registration offline".into()));
        }
        let scope = self
            .scopes
            .get(name)
            .ok_or_else(|| AuthorityError::IssuerUnknown {
                name: name.to_string(),
            })?;
        Ok(IssuerResponse {
            name: name.to_string(),
            public_key: scope.public_key.clone(),
        })
    }

    async fn sign_credentials(
        &self,
        name: &str,
        blinded_tokens: &[String],
    ) -> Result<SignCredentialsResponse, AuthorityError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if self.signing_down.load(Ordering::SeqCst) {
            return Err(AuthorityError::Unavailable("signer offline".into()));
        }
        let mut scope = self
            .scopes
            .get_mut(name)
            .ok_or_else(|| AuthorityError::IssuerUnknown {
                name: name.to_string(),
            })?;

        let requested = blinded_tokens.len() as u64;
        let remaining = scope.max_tokens.saturating_sub(scope.signed);
        if requested > remaining {
            return Err(AuthorityError::CapacityExceeded {
                name: name.to_string(),
                requested,
                remaining,
            });
        }
        scope.signed += requested;

        let signed_tokens: Vec<String> = blinded_tokens
            .iter()
            .map(|b| Self::signature_for(&scope.public_key, b))
            .collect();
        let proof_parts: Vec<&[u8]> = std::iter::once(scope.public_key.as_str().as_bytes())
            .chain(signed_tokens.iter().map(|s| s.as_bytes()))
            .collect();

        Ok(SignCredentialsResponse {
            batch_proof: digest_b64(&proof_parts),
            public_key: Some(scope.public_key.clone()),
            signed_tokens,
        })
    }
}
