//! SignatureStore trait: where an issuer remembers the last token it issued.
//!
//! An identity has at most one live signature. Issuing replaces it, logout
//! clears it, and verification compares against it. This is a session
//! pointer, not a revocation list: nothing about older tokens is retained.

use async_trait::async_trait;
use gwt_token::{Signature, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The last signature issued to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    #[serde(with = "signature_hex")]
    pub signature: Signature,
    /// When the token was issued (Unix ms).
    pub issued_at: Timestamp,
    /// The token header's expiry (Unix ms).
    pub expires: Timestamp,
}

/// Async persistence for [`SignatureRecord`]s, keyed by identity.
#[async_trait]
pub trait SignatureStore: Send + Sync {
    /// Store `record` as the identity's current signature.
    ///
    /// Returns the record it replaced, if any.
    async fn put_signature(
        &self,
        identity: &str,
        record: SignatureRecord,
    ) -> Result<Option<SignatureRecord>>;

    /// Fetch the identity's current signature.
    async fn get_signature(&self, identity: &str) -> Result<Option<SignatureRecord>>;

    /// Forget the identity's signature. Returns whether one existed.
    async fn clear_signature(&self, identity: &str) -> Result<bool>;
}

mod signature_hex {
    use gwt_token::Signature;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(sig: &Signature, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&sig.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Signature, D::Error> {
        let s = String::deserialize(d)?;
        Signature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
