//! # Order Credential Batches
//!
//! A batch of blinded credentials submitted for one order item.
//!
//! ## States
//!
//! ```text
//! Pending { blinded } ──sign──▶ Signed { blinded, signed, proof, public key }
//! ```
//!
//! `Signed` is terminal. The transition is validated: the signed batch must
//! answer exactly the blinded tokens of the pending row, one signature per
//! token, and a row is signed at most once.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokenmint_core::{IssuerId, ItemId, OrderId, PublicKey};

// ─── Errors ──────────────────────────────────────────────────────────

/// Rejected credential batch transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The authority returned a different number of signatures than tokens.
    #[error("signed batch has {signed} tokens but {blinded} were blinded")]
    LengthMismatch {
        /// Number of blinded tokens submitted.
        blinded: usize,
        /// Number of signed tokens returned.
        signed: usize,
    },

    /// The signed batch was produced for different blinded tokens.
    #[error("signed batch for item {item_id} does not answer its pending blinded tokens")]
    BlindedMismatch {
        /// The item whose pending row was targeted.
        item_id: ItemId,
    },

    /// The row has already been signed.
    #[error("credentials for item {item_id} are already signed")]
    AlreadySigned {
        /// The item whose row is already signed.
        item_id: ItemId,
    },
}

// ─── Signed payload ──────────────────────────────────────────────────

/// The four fields of a signed batch. Constructed only through
/// [`SignedCreds::new`], which enforces one signature per blinded token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSignedCreds")]
pub struct SignedCreds {
    blinded_creds: Vec<String>,
    signed_creds: Vec<String>,
    batch_proof: String,
    public_key: PublicKey,
}

#[derive(Deserialize)]
struct RawSignedCreds {
    blinded_creds: Vec<String>,
    signed_creds: Vec<String>,
    batch_proof: String,
    public_key: PublicKey,
}

impl TryFrom<RawSignedCreds> for SignedCreds {
    type Error = StateError;

    fn try_from(raw: RawSignedCreds) -> Result<Self, Self::Error> {
        Self::new(
            raw.blinded_creds,
            raw.signed_creds,
            raw.batch_proof,
            raw.public_key,
        )
    }
}

impl SignedCreds {
    /// Assemble a signed batch.
    ///
    /// `public_key` is the issuer's key at signing time; clients use it to
    /// verify `batch_proof`.
    pub fn new(
        blinded_creds: Vec<String>,
        signed_creds: Vec<String>,
        batch_proof: String,
        public_key: PublicKey,
    ) -> Result<Self, StateError> {
        if blinded_creds.len() != signed_creds.len() {
            return Err(StateError::LengthMismatch {
                blinded: blinded_creds.len(),
                signed: signed_creds.len(),
            });
        }
        Ok(Self {
            blinded_creds,
            signed_creds,
            batch_proof,
            public_key,
        })
    }

    pub fn blinded_creds(&self) -> &[String] {
        &self.blinded_creds
    }

    pub fn signed_creds(&self) -> &[String] {
        &self.signed_creds
    }

    pub fn batch_proof(&self) -> &str {
        &self.batch_proof
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

// ─── Lifecycle state ─────────────────────────────────────────────────

/// Lifecycle state of a credential batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum CredentialState {
    /// Awaiting signatures.
    Pending {
        /// Blinded tokens as submitted by the client, in order.
        blinded_creds: Vec<String>,
    },
    /// Signed by the issuer's authority scope (terminal).
    Signed(SignedCreds),
}

impl CredentialState {
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed(_))
    }
}

// ─── Batch record ────────────────────────────────────────────────────

/// Credentials for one order item, keyed by the item id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreds {
    /// Item this batch was purchased with.
    pub id: ItemId,
    pub order_id: OrderId,
    /// Issuer whose scope signs the batch.
    pub issuer_id: IssuerId,
    pub state: CredentialState,
}

impl OrderCreds {
    /// A new pending batch.
    pub fn pending(
        id: ItemId,
        order_id: OrderId,
        issuer_id: IssuerId,
        blinded_creds: Vec<String>,
    ) -> Self {
        Self {
            id,
            order_id,
            issuer_id,
            state: CredentialState::Pending { blinded_creds },
        }
    }

    /// The blinded tokens of this batch, in either state.
    pub fn blinded_creds(&self) -> &[String] {
        match &self.state {
            CredentialState::Pending { blinded_creds } => blinded_creds,
            CredentialState::Signed(signed) => signed.blinded_creds(),
        }
    }

    /// The signed payload, once signed.
    pub fn signed(&self) -> Option<&SignedCreds> {
        match &self.state {
            CredentialState::Pending { .. } => None,
            CredentialState::Signed(signed) => Some(signed),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.state.is_signed()
    }

    /// Transition `Pending -> Signed`.
    ///
    /// The signed batch must have been produced for this row's blinded
    /// tokens, in the same order.
    pub fn into_signed(self, signed: SignedCreds) -> Result<Self, StateError> {
        match &self.state {
            CredentialState::Signed(_) => Err(StateError::AlreadySigned { item_id: self.id }),
            CredentialState::Pending { blinded_creds } => {
                if blinded_creds.as_slice() != signed.blinded_creds() {
                    return Err(StateError::BlindedMismatch { item_id: self.id });
                }
                Ok(Self {
                    state: CredentialState::Signed(signed),
                    ..self
                })
            }
        }
    }
}
