//! Error types for the authority.

use gwt_core::{RbacError, ResourceType};
use gwt_store::StoreError;
use gwt_token::TokenError;
use gwt_vhash::CardError;
use thiserror::Error;

/// Errors that can occur during authority operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token error.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// The issuer's own resources could not be framed, e.g. an unregistered
    /// type or a count over the frame limit.
    #[error("rbac error: {0}")]
    Rbac(#[from] RbacError),

    /// Signature store error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Visual hash card error.
    #[error("card error: {0}")]
    Card(#[from] CardError),

    /// The token is authentic but no longer the identity's current one.
    #[error("token for {0:?} has been revoked or superseded")]
    Revoked(String),

    /// The token does not grant the requested access.
    #[error("{recipient:?} has no matching role on {resource_type}")]
    AccessDenied {
        recipient: String,
        resource_type: ResourceType,
    },

    /// The token was issued by someone this authority does not trust.
    #[error("untrusted issuer: {0:?}")]
    UnknownIssuer(String),
}

impl AuthError {
    /// The HTTP status an embedding service would typically answer with.
    pub fn status_hint(&self) -> u16 {
        match self {
            AuthError::Token(e) => match e {
                TokenError::MalformedToken(_)
                | TokenError::InvalidHeader(_)
                | TokenError::UnsupportedVersion(_)
                | TokenError::Payload(_) => 400,
                TokenError::InvalidSignature
                | TokenError::ExpiredToken
                | TokenError::Unsigned
                | TokenError::HeaderRejected(_)
                | TokenError::BodyRejected(_)
                | TokenError::Body(_) => 401,
            },
            AuthError::Revoked(_) | AuthError::UnknownIssuer(_) => 401,
            AuthError::AccessDenied { .. } => 403,
            AuthError::Rbac(_) | AuthError::Store(_) | AuthError::Card(_) => 500,
        }
    }
}

/// Result type for authority operations.
pub type Result<T> = std::result::Result<T, AuthError>;
