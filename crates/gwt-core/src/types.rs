//! Strong type definitions for fixed-length identifiers.
//!
//! Every id that travels inside an RBAC frame has the same canonical length,
//! [`ID_LEN`] bytes. Newtypes keep user ids and resource ids from being
//! mixed up at compile time.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical length of every id in an RBAC frame.
pub const ID_LEN: usize = 16;

macro_rules! fixed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub [u8; ID_LEN]);

        impl $name {
            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
                Self(bytes)
            }

            /// Generate a random id.
            pub fn generate() -> Self {
                let mut bytes = [0u8; ID_LEN];
                rand::thread_rng().fill_bytes(&mut bytes);
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; ID_LEN] {
                &self.0
            }

            /// Convert to hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from hex string.
            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let bytes = hex::decode(s)?;
                if bytes.len() != ID_LEN {
                    return Err(hex::FromHexError::InvalidStringLength);
                }
                let mut arr = [0u8; ID_LEN];
                arr.copy_from_slice(&bytes);
                Ok(Self(arr))
            }

            /// The all-zero id.
            pub const ZERO: Self = Self([0u8; ID_LEN]);
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; ID_LEN]> for $name {
            fn from(bytes: [u8; ID_LEN]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = std::array::TryFromSliceError;

            fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
                let arr: [u8; ID_LEN] = slice.try_into()?;
                Ok(Self(arr))
            }
        }
    };
}

fixed_id!(
    /// Identity that a set of resources belongs to.
    UserId
);

fixed_id!(
    /// Unique id of a single protected resource.
    ResourceId
);
