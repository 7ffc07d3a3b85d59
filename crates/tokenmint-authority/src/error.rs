//! Signing authority error types.

/// Errors from signing authority calls.
#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    /// HTTP transport error (connect, timeout, TLS).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The authority returned a non-2xx status.
    #[error("signing authority {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },

    /// No scope with this name exists at the authority.
    #[error("signing scope {name} is unknown to the authority")]
    IssuerUnknown { name: String },

    /// Signing would exceed the scope's token capacity.
    #[error("signing scope {name} cannot sign {requested} more tokens ({remaining} remaining)")]
    CapacityExceeded {
        name: String,
        requested: u64,
        remaining: u64,
    },

    /// The authority answered a sign request with the wrong number of tokens.
    #[error("signing scope {name} returned {signed} signed tokens for {blinded} blinded tokens")]
    BatchSizeMismatch {
        name: String,
        blinded: usize,
        signed: usize,
    },

    /// The authority is not reachable or refused service.
    #[error("signing authority unavailable: {0}")]
    Unavailable(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
