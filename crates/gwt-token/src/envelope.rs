//! Token header, envelope and signature types.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::{duration_ms, Clock, Timestamp};
use crate::error::{Result, TokenError};

/// Length of an HMAC-SHA512 tag.
pub const SIGNATURE_LEN: usize = 64;

/// Who issued a token, for whom, and until when.
///
/// `expires` is Unix milliseconds; zero means unset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    pub issuer: String,
    pub recipient: String,
    pub expires: Timestamp,
}

impl Header {
    pub fn new(issuer: impl Into<String>, recipient: impl Into<String>, expires: Timestamp) -> Self {
        Self {
            issuer: issuer.into(),
            recipient: recipient.into(),
            expires,
        }
    }

    /// A header that expires `ttl` from the clock's now.
    pub fn expiring(
        issuer: impl Into<String>,
        recipient: impl Into<String>,
        clock: &dyn Clock,
        ttl: Duration,
    ) -> Self {
        Self::new(
            issuer,
            recipient,
            clock.now_ms().saturating_add(duration_ms(ttl)),
        )
    }

    /// Check that all three fields are set.
    pub fn check_complete(&self) -> Result<()> {
        if self.issuer.is_empty() {
            return Err(TokenError::InvalidHeader("issuer is empty"));
        }
        if self.recipient.is_empty() {
            return Err(TokenError::InvalidHeader("recipient is empty"));
        }
        if self.expires == 0 {
            return Err(TokenError::InvalidHeader("expiry is unset"));
        }
        Ok(())
    }
}

/// An HMAC-SHA512 tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; SIGNATURE_LEN]);

impl Signature {
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> std::result::Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; SIGNATURE_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = TokenError;

    fn try_from(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; SIGNATURE_LEN] = slice.try_into().map_err(|_| {
            TokenError::MalformedToken(format!(
                "signature must be {SIGNATURE_LEN} bytes, got {}",
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

/// A header, a body, and the token they were signed into.
///
/// `token` and `signature` are set only by a successful encode or decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<T> {
    pub header: Header,
    pub body: T,
    pub token: Option<String>,
    pub signature: Option<Signature>,
}

impl<T> Envelope<T> {
    /// An unsigned envelope.
    pub fn new(header: Header, body: T) -> Self {
        Self {
            header,
            body,
            token: None,
            signature: None,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.token.is_some()
    }
}

/// The output of a successful encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token: String,
    pub signature: Signature,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}
