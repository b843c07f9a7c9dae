//! Error types for the token codec.

use thiserror::Error;

/// Boxed error returned by body codecs and validation predicates.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while encoding, decoding or validating a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token string is not two non-empty base64url segments.
    ///
    /// Characters outside the unpadded url-safe alphabet, an extra `.`, and
    /// non-zero trailing bits in a segment's last character all land here,
    /// before any signature check.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The signature does not match the payload, including a signature
    /// segment that decodes to the wrong length.
    #[error("invalid signature")]
    InvalidSignature,

    /// The token is outside its validity window.
    #[error("token expired")]
    ExpiredToken,

    /// Issuer, recipient or expiry is missing.
    #[error("invalid header: {0}")]
    InvalidHeader(&'static str),

    /// The payload carries a version this codec does not speak.
    #[error("unsupported payload version: {0}")]
    UnsupportedVersion(u64),

    /// The signed payload is not a canonical header/body map.
    #[error("invalid payload: {0}")]
    Payload(String),

    /// The body codec failed.
    #[error("body codec error: {0}")]
    Body(#[source] BoxError),

    /// The caller's header predicate rejected the token.
    #[error("header rejected: {0}")]
    HeaderRejected(#[source] BoxError),

    /// The caller's body predicate rejected the token.
    #[error("body rejected: {0}")]
    BodyRejected(#[source] BoxError),

    /// The envelope has never been signed or decoded.
    #[error("envelope carries no token")]
    Unsigned,
}

impl TokenError {
    pub(crate) fn body(err: impl Into<BoxError>) -> Self {
        TokenError::Body(err.into())
    }
}

/// Result type for token operations.
pub type Result<T> = std::result::Result<T, TokenError>;
