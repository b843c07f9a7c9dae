//! Symbolic resource/role types and the index tables that give them
//! single-byte codes on the wire.
//!
//! A [`Registry`] is built once, before any concurrent use, and is read-only
//! afterwards. It is passed explicitly into the codec so independent
//! registries never interfere with each other.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RbacError, Result, TypeKind};

/// Maximum number of entries in each index table.
pub const MAX_TYPES: usize = u8::MAX as usize + 1;

/// The kind of a protected resource.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(Cow<'static, str>);

impl ResourceType {
    pub const NETWORK: Self = Self(Cow::Borrowed("network"));
    pub const DATA_MANAGEMENT: Self = Self(Cow::Borrowed("data_management"));
    pub const USER_INTERFACE: Self = Self(Cow::Borrowed("user_interface"));
    pub const SECURITY_MONITOR: Self = Self(Cow::Borrowed("security_monitor"));
    pub const SYSTEM_ADMIN: Self = Self(Cow::Borrowed("system_admin"));
    pub const DEV_TOOLS: Self = Self(Cow::Borrowed("dev_tools"));
    pub const THIRD_PARTY: Self = Self(Cow::Borrowed("third_party"));

    /// Resource types known to [`Registry::standard`], in index order.
    pub const STANDARD: [Self; 7] = [
        Self::NETWORK,
        Self::DATA_MANAGEMENT,
        Self::USER_INTERFACE,
        Self::SECURITY_MONITOR,
        Self::SYSTEM_ADMIN,
        Self::DEV_TOOLS,
        Self::THIRD_PARTY,
    ];

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceType({})", self.0)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ResourceType {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

/// The kind of a role held on a resource.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleType(Cow<'static, str>);

impl RoleType {
    /// Owner (company).
    pub const OWNER: Self = Self(Cow::Borrowed("own"));
    /// Administrator.
    pub const ADMIN: Self = Self(Cow::Borrowed("adm"));
    /// Developer.
    pub const DEV: Self = Self(Cow::Borrowed("dev"));
    /// Moderator.
    pub const MOD: Self = Self(Cow::Borrowed("mod"));
    /// Guest.
    pub const GUEST: Self = Self(Cow::Borrowed("gst"));
    /// Regular user.
    pub const USER: Self = Self(Cow::Borrowed("usr"));

    /// Role types known to [`Registry::standard`], highest rank first.
    pub const STANDARD: [Self; 6] = [
        Self::OWNER,
        Self::ADMIN,
        Self::DEV,
        Self::MOD,
        Self::GUEST,
        Self::USER,
    ];

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this role ranks at or above `other` in `registry`.
    ///
    /// Rank follows registration order: earlier entries rank higher.
    /// Returns false if either role is not registered.
    pub fn outranks(&self, other: &RoleType, registry: &Registry) -> bool {
        match (registry.role_index(self), registry.role_index(other)) {
            (Ok(a), Ok(b)) => a <= b,
            _ => false,
        }
    }
}

impl fmt::Debug for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleType({})", self.0)
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for RoleType {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

/// One direction-pair of an index table.
#[derive(Debug, Clone)]
struct IndexTable<T> {
    by_index: Vec<T>,
    by_value: HashMap<T, u8>,
}

impl<T: Clone + Eq + std::hash::Hash + fmt::Display> IndexTable<T> {
    fn build(values: Vec<T>, kind: TypeKind) -> Result<Self> {
        if values.len() > MAX_TYPES {
            return Err(RbacError::RegistryFull(kind));
        }

        let mut by_value = HashMap::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            if by_value.insert(value.clone(), i as u8).is_some() {
                return Err(RbacError::DuplicateType {
                    kind,
                    name: value.to_string(),
                });
            }
        }

        Ok(Self {
            by_index: values,
            by_value,
        })
    }

    fn index_of(&self, value: &T, kind: TypeKind) -> Result<u8> {
        self.by_value
            .get(value)
            .copied()
            .ok_or_else(|| RbacError::UnregisteredType {
                kind,
                name: value.to_string(),
            })
    }

    fn value_at(&self, index: u8, kind: TypeKind) -> Result<&T> {
        self.by_index
            .get(index as usize)
            .ok_or(RbacError::UnknownTypeIndex { kind, index })
    }
}

/// Immutable bidirectional mapping between symbolic types and byte indices.
#[derive(Debug, Clone)]
pub struct Registry {
    resources: IndexTable<ResourceType>,
    roles: IndexTable<RoleType>,
}

impl Registry {
    /// Start building a registry with empty tables.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The registry holding the predefined resource and role types.
    pub fn standard() -> Self {
        let index = |i: usize| i as u8;
        Self {
            resources: IndexTable {
                by_index: ResourceType::STANDARD.to_vec(),
                by_value: ResourceType::STANDARD
                    .iter()
                    .enumerate()
                    .map(|(i, t)| (t.clone(), index(i)))
                    .collect(),
            },
            roles: IndexTable {
                by_index: RoleType::STANDARD.to_vec(),
                by_value: RoleType::STANDARD
                    .iter()
                    .enumerate()
                    .map(|(i, t)| (t.clone(), index(i)))
                    .collect(),
            },
        }
    }

    /// Wire index of a resource type.
    pub fn resource_index(&self, resource_type: &ResourceType) -> Result<u8> {
        self.resources.index_of(resource_type, TypeKind::Resource)
    }

    /// Resource type registered at `index`.
    pub fn resource_type(&self, index: u8) -> Result<&ResourceType> {
        self.resources.value_at(index, TypeKind::Resource)
    }

    /// Wire index of a role type.
    pub fn role_index(&self, role_type: &RoleType) -> Result<u8> {
        self.roles.index_of(role_type, TypeKind::Role)
    }

    /// Role type registered at `index`.
    pub fn role_type(&self, index: u8) -> Result<&RoleType> {
        self.roles.value_at(index, TypeKind::Role)
    }

    pub fn contains_resource_type(&self, resource_type: &ResourceType) -> bool {
        self.resources.by_value.contains_key(resource_type)
    }

    pub fn contains_role_type(&self, role_type: &RoleType) -> bool {
        self.roles.by_value.contains_key(role_type)
    }

    /// Registered resource types in index order.
    pub fn resource_types(&self) -> &[ResourceType] {
        &self.resources.by_index
    }

    /// Registered role types in index order.
    pub fn role_types(&self) -> &[RoleType] {
        &self.roles.by_index
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for a [`Registry`]. Indices are assigned in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    resource_types: Vec<ResourceType>,
    role_types: Vec<RoleType>,
}

impl RegistryBuilder {
    /// Seed the builder with the predefined types.
    pub fn with_standard_types(mut self) -> Self {
        self.resource_types.extend(ResourceType::STANDARD);
        self.role_types.extend(RoleType::STANDARD);
        self
    }

    pub fn resource_type(mut self, resource_type: impl Into<ResourceType>) -> Self {
        self.resource_types.push(resource_type.into());
        self
    }

    pub fn role_type(mut self, role_type: impl Into<RoleType>) -> Self {
        self.role_types.push(role_type.into());
        self
    }

    /// Freeze the tables.
    ///
    /// Fails on duplicate names or when a table exceeds [`MAX_TYPES`].
    pub fn build(self) -> Result<Registry> {
        Ok(Registry {
            resources: IndexTable::build(self.resource_types, TypeKind::Resource)?,
            roles: IndexTable::build(self.role_types, TypeKind::Role)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_indices_follow_declaration_order() {
        let registry = Registry::standard();
        assert_eq!(registry.resource_index(&ResourceType::NETWORK).unwrap(), 0);
        assert_eq!(registry.resource_index(&ResourceType::THIRD_PARTY).unwrap(), 6);
        assert_eq!(registry.role_index(&RoleType::OWNER).unwrap(), 0);
        assert_eq!(registry.role_index(&RoleType::USER).unwrap(), 5);
    }

    #[test]
    fn test_lookup_is_bidirectional() {
        let registry = Registry::standard();
        for (i, t) in registry.resource_types().iter().enumerate() {
            assert_eq!(registry.resource_type(i as u8).unwrap(), t);
        }
        for (i, t) in registry.role_types().iter().enumerate() {
            assert_eq!(registry.role_type(i as u8).unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_index() {
        let registry = Registry::standard();
        assert!(matches!(
            registry.resource_type(200),
            Err(RbacError::UnknownTypeIndex {
                kind: TypeKind::Resource,
                index: 200
            })
        ));
        assert!(matches!(
            registry.role_type(6),
            Err(RbacError::UnknownTypeIndex {
                kind: TypeKind::Role,
                ..
            })
        ));
    }

    #[test]
    fn test_unregistered_type() {
        let registry = Registry::standard();
        let err = registry
            .resource_index(&ResourceType::new("billing"))
            .unwrap_err();
        assert!(matches!(err, RbacError::UnregisteredType { .. }));
    }

    #[test]
    fn test_builder_extends_standard() {
        let registry = Registry::builder()
            .with_standard_types()
            .resource_type("dataManagementUserData")
            .build()
            .unwrap();
        assert_eq!(
            registry
                .resource_index(&ResourceType::new("dataManagementUserData"))
                .unwrap(),
            7
        );
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let err = Registry::builder()
            .role_type("dev")
            .role_type("dev")
            .build()
            .unwrap_err();
        assert!(matches!(err, RbacError::DuplicateType { .. }));
    }

    #[test]
    fn test_builder_rejects_overflow() {
        let mut builder = Registry::builder();
        for i in 0..=MAX_TYPES {
            builder = builder.resource_type(ResourceType::new(format!("type-{i}")));
        }
        assert!(matches!(
            builder.build(),
            Err(RbacError::RegistryFull(TypeKind::Resource))
        ));
    }

    #[test]
    fn test_full_table_is_allowed() {
        let mut builder = Registry::builder();
        for i in 0..MAX_TYPES {
            builder = builder.role_type(RoleType::new(format!("role-{i}")));
        }
        let registry = builder.build().unwrap();
        assert_eq!(registry.role_type(255).unwrap().as_str(), "role-255");
    }

    #[test]
    fn test_independent_registries() {
        let a = Registry::builder().resource_type("alpha").build().unwrap();
        let b = Registry::builder().resource_type("beta").build().unwrap();
        assert!(a.contains_resource_type(&ResourceType::new("alpha")));
        assert!(!b.contains_resource_type(&ResourceType::new("alpha")));
    }

    #[test]
    fn test_role_hierarchy() {
        let registry = Registry::standard();
        assert!(RoleType::OWNER.outranks(&RoleType::DEV, &registry));
        assert!(RoleType::DEV.outranks(&RoleType::DEV, &registry));
        assert!(!RoleType::GUEST.outranks(&RoleType::ADMIN, &registry));
        assert!(!RoleType::new("ghost").outranks(&RoleType::USER, &registry));
    }
}
