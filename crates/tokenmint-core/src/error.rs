//! # Core Errors
//!
//! Validation failures for the primitives defined in this crate.

use thiserror::Error;

/// Errors raised while constructing or parsing core primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A required field was empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A field that must carry standard base64 did not decode.
    #[error("{field} is not valid base64: {reason}")]
    InvalidBase64 {
        /// Name of the offending field.
        field: &'static str,
        /// Decoder diagnostic.
        reason: String,
    },

    /// Timestamp parsing failed or used a non-UTC offset.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An identifier string could not be parsed.
    #[error("invalid {kind} identifier {input:?}")]
    InvalidIdentifier {
        /// Which identifier namespace was being parsed.
        kind: &'static str,
        /// The rejected input.
        input: String,
    },
}
