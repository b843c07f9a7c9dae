//! Body codecs: how a token body becomes the bytes inside the payload.

use std::marker::PhantomData;

use gwt_core::{RbacError, Resources, ResourcesCodec};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::BoxError;

/// Turns a body into bytes and back.
///
/// Implementations must be deterministic: the same body must always encode
/// to the same bytes, since those bytes are what gets signed.
pub trait BodyCodec: Send + Sync {
    type Body;
    type Error: Into<BoxError>;

    fn encode_body(&self, body: &Self::Body) -> Result<Vec<u8>, Self::Error>;
    fn decode_body(&self, bytes: &[u8]) -> Result<Self::Body, Self::Error>;
}

/// RBAC bodies: [`Resources`] framed through a registry.
pub type RbacCodec = ResourcesCodec;

impl BodyCodec for ResourcesCodec {
    type Body = Resources;
    type Error = RbacError;

    fn encode_body(&self, body: &Resources) -> Result<Vec<u8>, RbacError> {
        self.serialize(body)
    }

    fn decode_body(&self, bytes: &[u8]) -> Result<Resources, RbacError> {
        self.deserialize(bytes)
    }
}

/// Opaque byte bodies, passed through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl BodyCodec for RawCodec {
    type Body = Vec<u8>;
    type Error = std::convert::Infallible;

    fn encode_body(&self, body: &Vec<u8>) -> Result<Vec<u8>, Self::Error> {
        Ok(body.clone())
    }

    fn decode_body(&self, bytes: &[u8]) -> Result<Vec<u8>, Self::Error> {
        Ok(bytes.to_vec())
    }
}

/// Any serde type, encoded as CBOR.
///
/// Struct fields encode in declaration order, so a given value always
/// produces the same bytes. Bodies containing hash maps are not stable.
pub struct CborCodec<T>(PhantomData<fn() -> T>);

impl<T> CborCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CborCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CborCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for CborCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CborCodec")
    }
}

impl<T: Serialize + DeserializeOwned> BodyCodec for CborCodec<T> {
    type Body = T;
    type Error = BoxError;

    fn encode_body(&self, body: &T) -> Result<Vec<u8>, BoxError> {
        let mut buf = Vec::new();
        ciborium::into_writer(body, &mut buf)?;
        Ok(buf)
    }

    fn decode_body(&self, bytes: &[u8]) -> Result<T, BoxError> {
        Ok(ciborium::from_reader(bytes)?)
    }
}
