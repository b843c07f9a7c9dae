//! # GWT Token
//!
//! Signed envelopes: a [`Header`] and a body, serialized canonically,
//! authenticated with HMAC-SHA512 and carried as a two-segment base64url
//! string.
//!
//! ## Wire Format
//!
//! ```text
//! base64url(payload) "." base64url(signature)
//! ```
//!
//! The payload is defined in [`canonical`]; the signature in [`signer`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gwt_core::{DefaultRole, Registry, Resource, ResourceType, Resources, UserId};
//! use gwt_token::{Envelope, RbacCodec, Spice, TokenCodec};
//!
//! let codec = TokenCodec::new(Spice::generate(), RbacCodec::new(Arc::new(Registry::standard())));
//! let body = Resources::new(UserId::generate())
//!     .with_resource(Resource::new(ResourceType::NETWORK, [DefaultRole::Dev.role()]));
//!
//! let mut envelope = Envelope::new(codec.header("issuer", "alice"), body);
//! let token = codec.encode(&mut envelope).unwrap();
//! let verified = codec.verify(&token.token).unwrap();
//! assert!(verified.body.has_access(&ResourceType::NETWORK, &[DefaultRole::Dev.role()]));
//! ```

pub mod body;
pub mod canonical;
pub mod clock;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod signer;
pub mod spice;

pub use body::{BodyCodec, CborCodec, RawCodec, RbacCodec};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use codec::{BodyPredicate, HeaderPredicate, TokenCodec, TOKEN_EXPIRE_TIME};
pub use envelope::{Envelope, Header, Signature, Token, SIGNATURE_LEN};
pub use error::{BoxError, Result, TokenError};
pub use spice::Spice;
