//! # GWT Testkit
//!
//! Testing utilities for GWT.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known inputs with expected frames, signatures and tokens
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test scenarios
//!
//! ## Golden Vectors
//!
//! ```rust
//! use gwt_testkit::vectors::{all_vectors, check_vector};
//!
//! for vector in all_vectors() {
//!     check_vector(&vector).unwrap();
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use gwt_testkit::generators::resources;
//!
//! proptest! {
//!     #[test]
//!     fn frame_roundtrip(r in resources(8)) {
//!         let registry = gwt_core::Registry::standard();
//!         let bytes = r.serialize(&registry).unwrap();
//!         prop_assert_eq!(gwt_core::Resources::deserialize(&bytes, &registry).unwrap(), r);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use gwt_testkit::fixtures::{alice_resources, TestFixture};
//! use gwt_token::Envelope;
//!
//! let fixture = TestFixture::new();
//! let codec = fixture.rbac_codec();
//! let mut envelope = Envelope::new(codec.header("Authentity", "alice"), alice_resources());
//! let token = codec.encode(&mut envelope).unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{alice_resources, TestFixture, FIXED_NOW};
pub use vectors::{all_vectors, check_vector, verify_all_vectors, GoldenVector};
