//! Compact binary framing for [`Resources`].
//!
//! Frame layout:
//!
//! ```text
//! [version: 1]
//! [user_id: 16] [resource_count: N]
//!   { [res_id: 16] [resource_type_index: 1] [role_count: N]
//!       { [role_type_index: 1] [permissions: 1] [claim_count: N]
//!           { [claim_len: N] [claim_bytes] } } }
//! ```
//!
//! With [`FrameFormat::Compact`] every `N` is one byte, capping counts and
//! claim lengths at 255. [`FrameFormat::Varint`] writes `N` as unsigned
//! LEB128, which is byte-identical to Compact for values below 128.
//!
//! The frame is not self-describing beyond its version byte: both ends must
//! share the same [`Registry`] index assignments.
//!
//! **This layout is FROZEN per version.** Changes need a new version byte.

use std::sync::Arc;

use crate::error::{RbacError, Result};
use crate::permission::Permission;
use crate::registry::Registry;
use crate::resource::{Resource, Resources};
use crate::role::{Claim, Role};
use crate::types::{ResourceId, UserId, ID_LEN};

/// Version byte of the single-byte-count frame.
pub const FRAME_VERSION_COMPACT: u8 = 0x01;

/// Version byte of the varint-count frame.
pub const FRAME_VERSION_VARINT: u8 = 0x02;

/// Largest count or length a Compact frame can carry.
pub const COMPACT_MAX: usize = u8::MAX as usize;

/// Largest count or length a Varint frame accepts.
pub const VARINT_MAX: usize = u32::MAX as usize;

/// How counts and lengths are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameFormat {
    /// One byte per count (the default wire contract).
    #[default]
    Compact,
    /// Unsigned LEB128 per count.
    Varint,
}

impl FrameFormat {
    pub const fn version(self) -> u8 {
        match self {
            FrameFormat::Compact => FRAME_VERSION_COMPACT,
            FrameFormat::Varint => FRAME_VERSION_VARINT,
        }
    }

    pub const fn from_version(version: u8) -> Option<Self> {
        match version {
            FRAME_VERSION_COMPACT => Some(FrameFormat::Compact),
            FRAME_VERSION_VARINT => Some(FrameFormat::Varint),
            _ => None,
        }
    }

    const fn max_count(self) -> usize {
        match self {
            FrameFormat::Compact => COMPACT_MAX,
            FrameFormat::Varint => VARINT_MAX,
        }
    }
}

/// Serialize `resources` into a frame.
pub fn serialize(resources: &Resources, registry: &Registry, format: FrameFormat) -> Result<Vec<u8>> {
    let mut w = FrameWriter::new(format);

    w.push(format.version());
    w.extend(resources.user_id.as_bytes());
    w.count("resource count", resources.resources.len())?;

    for resource in &resources.resources {
        w.extend(resource.res_id.as_bytes());
        w.push(registry.resource_index(&resource.resource_type)?);
        w.count("role count", resource.roles.len())?;

        for role in &resource.roles {
            w.push(registry.role_index(&role.role_type)?);
            w.push(role.permissions.bits());
            w.count("claim count", role.claims.len())?;

            for claim in &role.claims {
                let bytes = claim.as_str().as_bytes();
                w.count("claim length", bytes.len())?;
                w.extend(bytes);
            }
        }
    }

    Ok(w.finish())
}

/// Deserialize a frame of either version.
///
/// Every type index must resolve through `registry`; the whole input must be
/// consumed.
pub fn deserialize(bytes: &[u8], registry: &Registry) -> Result<Resources> {
    let mut r = FrameReader::new(bytes);

    let version = r.u8()?;
    let format = FrameFormat::from_version(version).ok_or(RbacError::UnsupportedVersion(version))?;
    r.format = format;

    let user_id = UserId::from_bytes(r.id()?);
    let resource_count = r.count()?;
    let mut resources = Vec::with_capacity(resource_count.min(r.remaining()));

    for _ in 0..resource_count {
        let res_id = ResourceId::from_bytes(r.id()?);
        let resource_type = registry.resource_type(r.u8()?)?.clone();

        let role_count = r.count()?;
        let mut roles = Vec::with_capacity(role_count.min(r.remaining()));
        for _ in 0..role_count {
            let role_type = registry.role_type(r.u8()?)?.clone();
            let permissions = Permission::from_bits(r.u8()?);

            let claim_count = r.count()?;
            let mut claims = Vec::with_capacity(claim_count.min(r.remaining()));
            for _ in 0..claim_count {
                let len = r.count()?;
                let raw = r.take(len)?;
                let text = std::str::from_utf8(raw)
                    .map_err(|e| RbacError::InvalidClaim(format!("not UTF-8: {e}")))?;
                claims.push(Claim::from_raw(text));
            }

            roles.push(Role {
                role_type,
                permissions,
                claims,
            });
        }

        resources.push(Resource {
            res_id,
            resource_type,
            roles,
        });
    }

    if r.remaining() > 0 {
        return Err(RbacError::TrailingBytes(r.remaining()));
    }

    Ok(Resources {
        user_id,
        resources,
    })
}

impl Resources {
    /// Serialize as a Compact frame.
    pub fn serialize(&self, registry: &Registry) -> Result<Vec<u8>> {
        serialize(self, registry, FrameFormat::Compact)
    }

    /// Deserialize a frame of either version.
    pub fn deserialize(bytes: &[u8], registry: &Registry) -> Result<Self> {
        deserialize(bytes, registry)
    }
}

/// A registry bound to a frame format.
///
/// Cheap to clone and safe to share across threads; every call allocates its
/// own buffers.
#[derive(Debug, Clone)]
pub struct ResourcesCodec {
    registry: Arc<Registry>,
    format: FrameFormat,
}

impl ResourcesCodec {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            format: FrameFormat::default(),
        }
    }

    pub fn with_format(mut self, format: FrameFormat) -> Self {
        self.format = format;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn serialize(&self, resources: &Resources) -> Result<Vec<u8>> {
        serialize(resources, &self.registry, self.format)
    }

    pub fn deserialize(&self, bytes: &[u8]) -> Result<Resources> {
        deserialize(bytes, &self.registry)
    }
}

struct FrameWriter {
    buf: Vec<u8>,
    format: FrameFormat,
}

impl FrameWriter {
    fn new(format: FrameFormat) -> Self {
        Self {
            buf: Vec::with_capacity(64),
            format,
        }
    }

    fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn count(&mut self, field: &'static str, n: usize) -> Result<()> {
        let max = self.format.max_count();
        if n > max {
            return Err(RbacError::SerializationLimitExceeded { field, len: n, max });
        }
        match self.format {
            FrameFormat::Compact => self.buf.push(n as u8),
            FrameFormat::Varint => encode_varint(&mut self.buf, n as u64),
        }
        Ok(())
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

struct FrameReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    format: FrameFormat,
}

impl<'a> FrameReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            format: FrameFormat::Compact,
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(RbacError::Truncated {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn id(&mut self) -> Result<[u8; ID_LEN]> {
        let mut id = [0u8; ID_LEN];
        id.copy_from_slice(self.take(ID_LEN)?);
        Ok(id)
    }

    fn count(&mut self) -> Result<usize> {
        match self.format {
            FrameFormat::Compact => Ok(self.u8()? as usize),
            FrameFormat::Varint => {
                let start = self.pos;
                let n = decode_varint(self.bytes, &mut self.pos)?;
                if n > VARINT_MAX as u64 {
                    return Err(RbacError::MalformedVarint(start));
                }
                Ok(n as usize)
            }
        }
    }
}

/// Append `n` as unsigned LEB128.
fn encode_varint(buf: &mut Vec<u8>, mut n: u64) {
    while n >= 0x80 {
        buf.push((n as u8) | 0x80);
        n >>= 7;
    }
    buf.push(n as u8);
}

/// Read an unsigned LEB128 value starting at `*pos`.
///
/// Rejects overlong encodings so every value has exactly one representation.
fn decode_varint(bytes: &[u8], pos: &mut usize) -> Result<u64> {
    let start = *pos;
    let mut value: u64 = 0;

    for i in 0..10 {
        let byte = *bytes.get(*pos).ok_or(RbacError::Truncated {
            offset: *pos,
            needed: 1,
        })?;
        *pos += 1;

        let bits = (byte & 0x7f) as u64;
        if i == 9 && bits > 1 {
            return Err(RbacError::MalformedVarint(start));
        }
        value |= bits << (7 * i);

        if byte & 0x80 == 0 {
            if i > 0 && byte == 0 {
                return Err(RbacError::MalformedVarint(start));
            }
            return Ok(value);
        }
    }

    Err(RbacError::MalformedVarint(start))
}
