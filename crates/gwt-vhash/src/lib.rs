//! # GWT Visual Hash
//!
//! Renders a token signature as a grid of colored cells on a card template,
//! and reads it back by sampling each cell.
//!
//! The card is advisory: it lets a person or camera compare a signature
//! offline. The HMAC check on the token itself is what authenticates.
//!
//! ## Masking
//!
//! Two masks can be XOR-blended over the grid:
//!
//! - a pattern image configured alongside the template, and
//! - a per-card [`CardMask`], see [`MaskMode`].
//!
//! A [`MaskMode::OneTime`] mask is random and is returned to the caller, who
//! must store it to decode the card later. A [`MaskMode::Derived`] mask is
//! recomputed from key material via [`CardCodec::derived_mask`].

pub mod card;
pub mod color;
pub mod config;
pub mod error;
pub mod mask;
pub mod text;

pub use card::{CardCodec, EncodedCard};
pub use config::{CardConfig, GridOrigin};
pub use error::{CardError, Result};
pub use mask::{CardMask, MaskMode};
pub use text::hash_text;
