//! Proptest generators for property-based testing.

use proptest::prelude::*;

use gwt_core::{
    Claim, Permission, Resource, ResourceId, ResourceType, Resources, Role, RoleType, UserId,
};
use gwt_token::{Header, Spice};

/// Generate a random UserId.
pub fn user_id() -> impl Strategy<Value = UserId> {
    any::<[u8; 16]>().prop_map(UserId::from_bytes)
}

/// Generate a random ResourceId.
pub fn resource_id() -> impl Strategy<Value = ResourceId> {
    any::<[u8; 16]>().prop_map(ResourceId::from_bytes)
}

/// Generate one of the standard resource types.
pub fn resource_type() -> impl Strategy<Value = ResourceType> {
    prop::sample::select(ResourceType::STANDARD.to_vec())
}

/// Generate one of the standard role types.
pub fn role_type() -> impl Strategy<Value = RoleType> {
    prop::sample::select(RoleType::STANDARD.to_vec())
}

/// Generate any permission byte, including unnamed high bits.
pub fn permission() -> impl Strategy<Value = Permission> {
    any::<u8>().prop_map(Permission::from_bits)
}

/// Generate a `key.value` claim. Values may themselves contain dots.
pub fn claim() -> impl Strategy<Value = Claim> {
    ("[a-z][a-z0-9_]{0,11}", "[ -~]{0,24}")
        .prop_map(|(key, value)| Claim::from_raw(format!("{key}.{value}")))
}

/// Generate a role with up to four claims.
pub fn role() -> impl Strategy<Value = Role> {
    (role_type(), permission(), prop::collection::vec(claim(), 0..4)).prop_map(
        |(role_type, permissions, claims)| Role {
            role_type,
            permissions,
            claims,
        },
    )
}

/// Generate a resource with up to four roles.
pub fn resource() -> impl Strategy<Value = Resource> {
    (resource_id(), resource_type(), prop::collection::vec(role(), 0..4)).prop_map(
        |(res_id, resource_type, roles)| Resource {
            res_id,
            resource_type,
            roles,
        },
    )
}

/// Generate a resource set with at most `max` resources.
pub fn resources(max: usize) -> impl Strategy<Value = Resources> {
    (user_id(), prop::collection::vec(resource(), 0..=max))
        .prop_map(|(user_id, resources)| Resources { user_id, resources })
}

/// Generate a complete header.
pub fn header() -> impl Strategy<Value = Header> {
    ("[A-Za-z][A-Za-z0-9]{0,15}", "[a-z][a-z0-9.@]{0,23}", 1i64..=i64::MAX / 2)
        .prop_map(|(issuer, recipient, expires)| Header::new(issuer, recipient, expires))
}

/// Generate spice halves of 1 to 64 bytes.
pub fn spice() -> impl Strategy<Value = Spice> {
    (
        prop::collection::vec(any::<u8>(), 1..=64),
        prop::collection::vec(any::<u8>(), 1..=64),
    )
        .prop_map(|(salt, pepper)| Spice::new(salt, pepper))
}

/// Generate a 64-byte signature-sized hash.
pub fn signature_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 64)
}
