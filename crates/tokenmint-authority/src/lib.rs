//! # tokenmint-authority — Signing Authority Client
//!
//! The signing authority holds one blind-signing key pair per named scope.
//! This crate is the only path from tokenmint to that service.
//!
//! ## Operations
//!
//! | Operation | HTTP |
//! |-----------|------|
//! | [`SigningAuthority::create_issuer`] | `POST /v1/issuer/` |
//! | [`SigningAuthority::get_issuer`] | `GET /v1/issuer/{name}` |
//! | [`SigningAuthority::sign_credentials`] | `POST /v1/blindedToken/{name}/` |
//!
//! Scope registration is idempotent by name: registering a scope that
//! already exists succeeds without replacing its key.
//!
//! No call is retried here. Retry policy belongs to the caller.

pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

pub use config::{AuthorityConfig, ConfigError};
pub use error::AuthorityError;
pub use http::HttpSigningAuthority;
pub use mock::MockSigningAuthority;
pub use types::{CredentialRedemption, IssuerResponse, SignCredentialsResponse};

/// Shared handle to a signing authority implementation.
pub type SharedAuthority = Arc<dyn SigningAuthority>;

/// Operations offered by the signing authority.
///
/// Dropping a returned future cancels the call; no local state is left
/// behind by a cancelled call.
#[async_trait]
pub trait SigningAuthority: Send + Sync {
    /// Register a signing scope named `name` that may sign at most
    /// `max_tokens` tokens over its lifetime.
    async fn create_issuer(&self, name: &str, max_tokens: u64) -> Result<(), AuthorityError>;

    /// Fetch the public key of scope `name`.
    async fn get_issuer(&self, name: &str) -> Result<IssuerResponse, AuthorityError>;

    /// Blindly sign `blinded_tokens` under scope `name`, producing one signed
    /// token per input plus a single proof for the batch.
    async fn sign_credentials(
        &self,
        name: &str,
        blinded_tokens: &[String],
    ) -> Result<SignCredentialsResponse, AuthorityError>;
}
