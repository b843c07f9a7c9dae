//! # GWT
//!
//! Compact signed access tokens carrying role-based authorization data.
//!
//! ## Overview
//!
//! - **RBAC model**: [`Resources`] held by a user, each with [`Role`]s,
//!   [`Permission`]s and claims, framed into a few bytes via a [`Registry`]
//! - **Tokens**: header + body, canonically encoded, HMAC-signed and carried
//!   as `base64url(payload).base64url(signature)`
//! - **Visual hash cards**: a signature rendered as a PNG color grid
//! - **Authority**: issue / verify / authorize / refresh / logout over a
//!   pluggable signature store
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gwt::{Authority, AuthorityConfig, DefaultRole, Registry, Resource, ResourceType, Resources, Spice, UserId};
//! use gwt::store::MemoryStore;
//!
//! async fn example() {
//!     let authority = Authority::new(
//!         AuthorityConfig::new("Authentity"),
//!         Spice::generate(),
//!         Arc::new(Registry::standard()),
//!         MemoryStore::new(),
//!     );
//!
//!     let resources = Resources::new(UserId::generate())
//!         .with_resource(Resource::new(ResourceType::DATA_MANAGEMENT, [DefaultRole::User.role()]));
//!
//!     let token = authority.issue("alice", resources).await.unwrap();
//!     authority
//!         .authorize(&token.token, &ResourceType::DATA_MANAGEMENT, &[DefaultRole::User.role()])
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `gwt::core` - RBAC model, registry and frame codec
//! - `gwt::token` - Envelope codec, spice and clocks
//! - `gwt::vhash` - Visual hash cards
//! - `gwt::store` - Signature store seam

pub mod authority;
pub mod error;

// Re-export component crates
pub use gwt_core as core;
pub use gwt_store as store;
pub use gwt_token as token;
pub use gwt_vhash as vhash;

// Re-export main types for convenience
pub use authority::{Authority, AuthorityConfig};
pub use error::{AuthError, Result};

// Re-export commonly used types
pub use gwt_core::{
    Claim, DefaultRole, Permission, Registry, Resource, ResourceId, ResourceType, Resources, Role,
    RoleType, UserId,
};
pub use gwt_token::{Envelope, Header, Signature, Spice, Token, TokenCodec, TokenError};
