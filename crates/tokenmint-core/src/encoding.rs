//! Base64 checks for opaque credential material.
//!
//! Public keys, token preimages, and signatures arrive from clients as
//! standard (padded) base64. This core never decodes them for use; it only
//! rejects values that would be refused by the signing authority anyway.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::CoreError;

/// Require `value` to be a non-empty standard base64 string.
pub fn require_base64(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::Empty { field });
    }
    BASE64
        .decode(value)
        .map(|_| ())
        .map_err(|e| CoreError::InvalidBase64 {
            field,
            reason: e.to_string(),
        })
}
