//! # GWT Core
//!
//! The RBAC model carried inside GWT access tokens, the registry that maps
//! type names to wire indices, and the compact binary frame codec.
//!
//! This crate contains no I/O and no cryptography. It is pure computation
//! over the permission model.
//!
//! ## Key Types
//!
//! - [`Resources`] - Everything one identity may access
//! - [`Resource`] - A typed, identified object with the roles held on it
//! - [`Role`] - A role type, a [`Permission`] mask and claims
//! - [`Registry`] - Name-to-index tables shared by encoder and decoder
//!
//! ## Wire Format
//!
//! See the [`codec`] module. Both ends of a frame must agree on the
//! [`Registry`].

pub mod codec;
pub mod error;
pub mod permission;
pub mod registry;
pub mod resource;
pub mod role;
pub mod types;

pub use codec::{deserialize, serialize, FrameFormat, ResourcesCodec};
pub use error::{RbacError, Result, TypeKind};
pub use permission::Permission;
pub use registry::{Registry, RegistryBuilder, ResourceType, RoleType};
pub use resource::{Resource, Resources};
pub use role::{Claim, DefaultRole, Role};
pub use types::{ResourceId, UserId, ID_LEN};
