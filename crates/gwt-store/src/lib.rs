//! # GWT Store
//!
//! The persistence seam an issuer uses to remember the last signature it
//! issued to each identity, plus an in-memory implementation.
//!
//! Durable backends (a relational table, a cache) implement
//! [`SignatureStore`] outside this workspace.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use traits::{SignatureRecord, SignatureStore};
