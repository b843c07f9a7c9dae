//! Error types for the RBAC model and codec.

use std::fmt;

use thiserror::Error;

/// Which of the two registry tables an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Resource,
    Role,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Resource => f.write_str("resource type"),
            TypeKind::Role => f.write_str("role type"),
        }
    }
}

/// Errors that can occur while building registries or (de)serializing frames.
#[derive(Debug, Error)]
pub enum RbacError {
    #[error("unknown {kind} index: {index}")]
    UnknownTypeIndex { kind: TypeKind, index: u8 },

    #[error("{kind} {name:?} is not registered")]
    UnregisteredType { kind: TypeKind, name: String },

    #[error("{field} of {len} exceeds the frame limit of {max}")]
    SerializationLimitExceeded {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("frame truncated at offset {offset}: needed {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    #[error("{0} trailing bytes after frame")]
    TrailingBytes(usize),

    #[error("unsupported frame version: {0}")]
    UnsupportedVersion(u8),

    #[error("malformed varint at offset {0}")]
    MalformedVarint(usize),

    #[error("{kind} {name:?} registered twice")]
    DuplicateType { kind: TypeKind, name: String },

    #[error("{0} table is full")]
    RegistryFull(TypeKind),

    #[error("invalid claim: {0}")]
    InvalidClaim(String),
}

/// Result type for RBAC operations.
pub type Result<T> = std::result::Result<T, RbacError>;
