//! Typed HTTP client for the signing authority.
//!
//! Wraps a `reqwest::Client` with the authority base URL, bearer
//! authentication, and a per-request timeout. Scope names are placed in the
//! URL as path segments, so merchant ids containing `/` or spaces are
//! percent-encoded rather than altering the route.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::config::{AuthorityConfig, ConfigError};
use crate::error::AuthorityError;
use crate::types::{
    CreateIssuerRequest, IssuerResponse, SignCredentialsRequest, SignCredentialsResponse,
};
use crate::SigningAuthority;

/// HTTP client for a challenge-bypass style signing authority.
#[derive(Debug, Clone)]
pub struct HttpSigningAuthority {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpSigningAuthority {
    /// Build a client from configuration.
    pub fn new(config: AuthorityConfig) -> Result<Self, AuthorityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                let mut auth = reqwest::header::HeaderValue::from_str(&format!(
                    "Bearer {}",
                    config.api_token.as_str()
                ))
                .map_err(|_| AuthorityError::Config(ConfigError::InvalidToken))?;
                auth.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, auth);
                headers
            })
            .build()
            .map_err(|e| AuthorityError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// `{base_url}/{segments...}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, AuthorityError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AuthorityError::Config(ConfigError::InvalidUrl(
                    self.base_url.to_string(),
                    "URL cannot carry a path".into(),
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<reqwest::Response, AuthorityError> {
        request.send().await.map_err(|e| AuthorityError::Http {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

async fn api_error(endpoint: &str, resp: reqwest::Response) -> AuthorityError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    AuthorityError::Api {
        endpoint: endpoint.to_string(),
        status,
        body,
    }
}

#[async_trait]
impl SigningAuthority for HttpSigningAuthority {
    async fn create_issuer(&self, name: &str, max_tokens: u64) -> Result<(), AuthorityError> {
        let endpoint = "POST /v1/issuer/";
        let url = self.url(&["v1", "issuer", ""])?;
        let body = CreateIssuerRequest { name, max_tokens };

        let resp = self.send(self.http.post(url).json(&body), endpoint).await?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => {
                tracing::debug!(issuer = name, "signing scope already registered");
                Ok(())
            }
            _ => Err(api_error(endpoint, resp).await),
        }
    }

    async fn get_issuer(&self, name: &str) -> Result<IssuerResponse, AuthorityError> {
        let endpoint = format!("GET /v1/issuer/{name}");
        let url = self.url(&["v1", "issuer", name])?;

        let resp = self.send(self.http.get(url), &endpoint).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(AuthorityError::IssuerUnknown {
                name: name.to_string(),
            });
        }
        if !resp.status().is_success() {
            return Err(api_error(&endpoint, resp).await);
        }

        resp.json()
            .await
            .map_err(|e| AuthorityError::Deserialization { endpoint, source: e })
    }

    async fn sign_credentials(
        &self,
        name: &str,
        blinded_tokens: &[String],
    ) -> Result<SignCredentialsResponse, AuthorityError> {
        let endpoint = format!("POST /v1/blindedToken/{name}/");
        let url = self.url(&["v1", "blindedToken", name, ""])?;
        let body = SignCredentialsRequest { blinded_tokens };

        let resp = self.send(self.http.post(url).json(&body), &endpoint).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(AuthorityError::IssuerUnknown {
                name: name.to_string(),
            });
        }
        if !resp.status().is_success() {
            return Err(api_error(&endpoint, resp).await);
        }

        resp.json()
            .await
            .map_err(|e| AuthorityError::Deserialization { endpoint, source: e })
    }
}
