//! Canonical CBOR encoding of the signed payload.
//!
//! The payload is a definite-length map with integer keys in ascending
//! order and shortest-form integers (RFC 8949 Core Deterministic Encoding):
//!
//! ```text
//! { 0: version, 1: issuer (text), 2: recipient (text), 3: expires (int), 4: body (bytes) }
//! ```
//!
//! The same bytes are signed by the encoder and checked by the decoder, so
//! this module is the single definition of "what was signed".

use ciborium::value::Value;

use crate::envelope::Header;
use crate::error::{Result, TokenError};

/// Current payload version.
pub const PAYLOAD_VERSION: u64 = 1;

/// Payload field keys (all encode as single bytes).
mod keys {
    pub const VERSION: u64 = 0;
    pub const ISSUER: u64 = 1;
    pub const RECIPIENT: u64 = 2;
    pub const EXPIRES: u64 = 3;
    pub const BODY: u64 = 4;
}

const FIELD_COUNT: u64 = 5;

/// Encode a header and an already-encoded body.
pub fn encode_payload(header: &Header, body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + header.issuer.len() + header.recipient.len() + body.len());

    // Major type 5: map
    encode_uint(&mut buf, 5, FIELD_COUNT);

    encode_uint(&mut buf, 0, keys::VERSION);
    encode_uint(&mut buf, 0, PAYLOAD_VERSION);

    encode_uint(&mut buf, 0, keys::ISSUER);
    encode_text(&mut buf, &header.issuer);

    encode_uint(&mut buf, 0, keys::RECIPIENT);
    encode_text(&mut buf, &header.recipient);

    encode_uint(&mut buf, 0, keys::EXPIRES);
    encode_int(&mut buf, header.expires);

    encode_uint(&mut buf, 0, keys::BODY);
    encode_bytes(&mut buf, body);

    buf
}

/// Decode a payload into its header and body bytes.
///
/// Anything other than the exact canonical encoding is rejected.
pub fn decode_payload(bytes: &[u8]) -> Result<(Header, Vec<u8>)> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| TokenError::Payload(e.to_string()))?;

    let map = match value {
        Value::Map(m) => m,
        _ => return Err(TokenError::Payload("expected map".into())),
    };

    let version = get_uint(&map, keys::VERSION)?;
    if version != PAYLOAD_VERSION {
        return Err(TokenError::UnsupportedVersion(version));
    }

    let header = Header {
        issuer: get_text(&map, keys::ISSUER)?,
        recipient: get_text(&map, keys::RECIPIENT)?,
        expires: get_int(&map, keys::EXPIRES)?,
    };
    let body = get_bytes(&map, keys::BODY)?;

    if encode_payload(&header, &body) != bytes {
        return Err(TokenError::Payload("non-canonical encoding".into()));
    }

    Ok((header, body))
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoding
// ─────────────────────────────────────────────────────────────────────────────

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a signed integer (major types 0 and 1).
fn encode_int(buf: &mut Vec<u8>, n: i64) {
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

fn encode_bytes(buf: &mut Vec<u8>, b: &[u8]) {
    encode_uint(buf, 2, b.len() as u64);
    buf.extend_from_slice(b);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoding helpers
// ─────────────────────────────────────────────────────────────────────────────

fn get(map: &[(Value, Value)], key: u64) -> Result<&Value> {
    map.iter()
        .find(|(k, _)| matches!(k, Value::Integer(i) if u64::try_from(*i).ok() == Some(key)))
        .map(|(_, v)| v)
        .ok_or_else(|| TokenError::Payload(format!("missing field {key}")))
}

fn get_uint(map: &[(Value, Value)], key: u64) -> Result<u64> {
    match get(map, key)? {
        Value::Integer(i) => {
            u64::try_from(*i).map_err(|_| TokenError::Payload(format!("field {key} out of range")))
        }
        _ => Err(TokenError::Payload(format!("field {key}: expected integer"))),
    }
}

fn get_int(map: &[(Value, Value)], key: u64) -> Result<i64> {
    match get(map, key)? {
        Value::Integer(i) => {
            i64::try_from(*i).map_err(|_| TokenError::Payload(format!("field {key} out of range")))
        }
        _ => Err(TokenError::Payload(format!("field {key}: expected integer"))),
    }
}

fn get_text(map: &[(Value, Value)], key: u64) -> Result<String> {
    match get(map, key)? {
        Value::Text(s) => Ok(s.clone()),
        _ => Err(TokenError::Payload(format!("field {key}: expected text"))),
    }
}

fn get_bytes(map: &[(Value, Value)], key: u64) -> Result<Vec<u8>> {
    match get(map, key)? {
        Value::Bytes(b) => Ok(b.clone()),
        _ => Err(TokenError::Payload(format!("field {key}: expected bytes"))),
    }
}
