//! Key material shared by signer and verifier.

use std::fmt;

use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of each half produced by [`Spice::generate`].
pub const SPICE_HALF_LEN: usize = 32;

/// The HMAC keying pair.
///
/// `salt` is the HMAC key; `pepper` is mixed into every signed message.
/// Both bytes are wiped when the value is dropped and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Spice {
    salt: Vec<u8>,
    pepper: Vec<u8>,
}

impl Spice {
    pub fn new(salt: impl Into<Vec<u8>>, pepper: impl Into<Vec<u8>>) -> Self {
        Self {
            salt: salt.into(),
            pepper: pepper.into(),
        }
    }

    /// Generate fresh random key material.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut salt = vec![0u8; SPICE_HALF_LEN];
        let mut pepper = vec![0u8; SPICE_HALF_LEN];
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut pepper);
        Self { salt, pepper }
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn pepper(&self) -> &[u8] {
        &self.pepper
    }
}

impl PartialEq for Spice {
    fn eq(&self, other: &Self) -> bool {
        (self.salt.ct_eq(&other.salt) & self.pepper.ct_eq(&other.pepper)).into()
    }
}

impl Eq for Spice {}

impl fmt::Debug for Spice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spice")
            .field("salt", &"<redacted>")
            .field("pepper", &"<redacted>")
            .finish()
    }
}
