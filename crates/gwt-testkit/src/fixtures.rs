//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use gwt::{Authority, AuthorityConfig};
use gwt_core::{DefaultRole, Registry, Resource, ResourceId, ResourceType, Resources, UserId};
use gwt_store::MemoryStore;
use gwt_token::{ManualClock, RawCodec, RbacCodec, Spice, TokenCodec};
use gwt_vhash::{CardCodec, CardConfig};
use image::{Rgba, RgbaImage};

/// 2026-01-14T16:00:00Z in Unix milliseconds.
pub const FIXED_NOW: i64 = 1_736_870_400_000;

/// Issuer name used across fixtures.
pub const ISSUER: &str = "Authentity";

/// A test fixture with fixed key material, the standard registry and a
/// manual clock.
pub struct TestFixture {
    pub spice: Spice,
    pub registry: Arc<Registry>,
    pub clock: Arc<ManualClock>,
}

impl TestFixture {
    /// Create a fixture with fixed spice and the clock at [`FIXED_NOW`].
    pub fn new() -> Self {
        Self {
            spice: Spice::new(b"fixture-salt".to_vec(), b"fixture-pepper".to_vec()),
            registry: Arc::new(Registry::standard()),
            clock: Arc::new(ManualClock::new(FIXED_NOW)),
        }
    }

    /// Create with random key material.
    pub fn with_random_spice() -> Self {
        Self {
            spice: Spice::generate(),
            ..Self::new()
        }
    }

    /// A token codec for RBAC bodies on this fixture's clock.
    pub fn rbac_codec(&self) -> TokenCodec<RbacCodec> {
        TokenCodec::new(self.spice.clone(), RbacCodec::new(self.registry.clone()))
            .with_clock(self.clock.clone())
    }

    /// A token codec for opaque bodies on this fixture's clock.
    pub fn raw_codec(&self) -> TokenCodec<RawCodec> {
        TokenCodec::new(self.spice.clone(), RawCodec).with_clock(self.clock.clone())
    }

    /// An authority over a fresh in-memory store.
    pub fn authority(&self) -> Authority<MemoryStore> {
        Authority::new(
            AuthorityConfig::new(ISSUER),
            self.spice.clone(),
            self.registry.clone(),
            MemoryStore::new(),
        )
        .with_clock(self.clock.clone())
    }

    /// An authority that can render cards.
    pub fn authority_with_cards(&self) -> Authority<MemoryStore> {
        self.authority().with_cards(card_codec())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A card codec on a plain template with a gradient pattern.
pub fn card_codec() -> CardCodec {
    let template = RgbaImage::from_pixel(256, 320, Rgba([245, 245, 240, 255]));
    let pattern = RgbaImage::from_fn(128, 128, |x, y| {
        Rgba([(x * 2) as u8, (y * 2) as u8, (x ^ y) as u8, 255])
    });
    CardCodec::new(CardConfig::default(), template, Some(pattern)).expect("fixture card geometry")
}

/// Alice's resources: a user on data management and a dev on dev tools.
pub fn alice_resources() -> Resources {
    Resources::new(UserId::from_bytes([0xa1; 16]))
        .with_resource(Resource {
            res_id: ResourceId::from_bytes([0x01; 16]),
            resource_type: ResourceType::DATA_MANAGEMENT,
            roles: vec![DefaultRole::User.role()],
        })
        .with_resource(Resource {
            res_id: ResourceId::from_bytes([0x02; 16]),
            resource_type: ResourceType::DEV_TOOLS,
            roles: vec![DefaultRole::Dev.role()],
        })
}

/// An admin over the whole standard registry.
pub fn admin_resources(user_id: UserId) -> Resources {
    ResourceType::STANDARD
        .into_iter()
        .fold(Resources::new(user_id), |acc, resource_type| {
            acc.with_resource(Resource::new(resource_type, [DefaultRole::Admin.role()]))
        })
}
