//! Wire types exchanged with the signing authority and handed to the
//! redemption verifier.

use serde::{Deserialize, Serialize};
use tokenmint_core::PublicKey;

/// Body of `POST /v1/issuer/`.
#[derive(Debug, Serialize)]
pub struct CreateIssuerRequest<'a> {
    pub name: &'a str,
    pub max_tokens: u64,
}

/// Response of `GET /v1/issuer/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerResponse {
    pub name: String,
    pub public_key: PublicKey,
}

/// Body of `POST /v1/blindedToken/{name}/`.
#[derive(Debug, Serialize)]
pub struct SignCredentialsRequest<'a> {
    pub blinded_tokens: &'a [String],
}

/// Response of `POST /v1/blindedToken/{name}/`.
///
/// `signed_tokens[i]` answers `blinded_tokens[i]` of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignCredentialsResponse {
    pub signed_tokens: Vec<String>,
    pub batch_proof: String,
    /// Some authority versions echo the scope key; not relied upon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKey>,
}

/// One unblinded credential ready for verification by the redemption
/// service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRedemption {
    /// Name of the signing scope that issued the credential.
    pub issuer: String,
    pub token_preimage: String,
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redemption_uses_camel_case_fields() {
        let r = CredentialRedemption {
            issuer: "M3".into(),
            token_preimage: "t1".into(),
            signature: "s1".into(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"issuer": "M3", "tokenPreimage": "t1", "signature": "s1"})
        );
    }

    #[test]
    fn sign_response_tolerates_missing_public_key() {
        let resp: SignCredentialsResponse = serde_json::from_str(
            r#"{"signed_tokens":["s1"],"batch_proof":"p"}"#,
        )
        .unwrap();
        assert_eq!(resp.signed_tokens, vec!["s1"]);
        assert!(resp.public_key.is_none());
    }

    #[test]
    fn create_request_uses_snake_case() {
        let body = serde_json::to_value(CreateIssuerRequest {
            name: "M1",
            max_tokens: 4_000_000,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"name": "M1", "max_tokens": 4000000}));
    }
}
