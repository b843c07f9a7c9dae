//! HMAC signing of canonical payloads.
//!
//! `tag = HMAC-SHA512(key = salt, msg = DOMAIN || u32be(len(pepper)) || pepper || payload)`
//!
//! The pepper is length-prefixed so that no (pepper, payload) split can
//! collide with another.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use crate::envelope::{Signature, SIGNATURE_LEN};
use crate::spice::Spice;

type HmacSha512 = Hmac<Sha512>;

/// Domain separation prefix for token signatures.
pub const SIGNATURE_DOMAIN: &[u8] = b"gwt/token-sig/v1";

/// Compute the signature over `payload`.
pub fn sign(spice: &Spice, payload: &[u8]) -> Signature {
    let mut mac = mac_for(spice);
    mac.update(payload);

    let mut out = [0u8; SIGNATURE_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Signature(out)
}

/// Recompute and compare in constant time.
pub fn verify(spice: &Spice, payload: &[u8], signature: &[u8]) -> bool {
    let expected = sign(spice, payload);
    expected.as_bytes()[..].ct_eq(signature).into()
}

fn mac_for(spice: &Spice) -> HmacSha512 {
    // HMAC accepts keys of any length, including empty.
    let mut mac = <HmacSha512 as Mac>::new_from_slice(spice.salt())
        .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
    mac.update(SIGNATURE_DOMAIN);
    mac.update(&(spice.pepper().len() as u32).to_be_bytes());
    mac.update(spice.pepper());
    mac
}
