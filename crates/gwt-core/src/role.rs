//! Roles and the free-form claims attached to them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RbacError, Result};
use crate::permission::Permission;
use crate::registry::RoleType;

/// Delimiter between a claim's key and its value.
pub const CLAIM_DELIMITER: char = '.';

/// A single `key.value` pair.
///
/// The first `.` is the boundary: keys never contain one, values may.
/// A claim without a delimiter has an empty value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claim(String);

impl Claim {
    /// Build a claim from a key and a value.
    pub fn new(key: &str, value: &str) -> Result<Self> {
        if key.contains(CLAIM_DELIMITER) {
            return Err(RbacError::InvalidClaim(format!(
                "key {key:?} contains {CLAIM_DELIMITER:?}"
            )));
        }
        Ok(Self(format!("{key}{CLAIM_DELIMITER}{value}")))
    }

    /// Wrap an already joined claim string as-is.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn key(&self) -> &str {
        match self.0.split_once(CLAIM_DELIMITER) {
            Some((key, _)) => key,
            None => &self.0,
        }
    }

    pub fn value(&self) -> &str {
        match self.0.split_once(CLAIM_DELIMITER) {
            Some((_, value)) => value,
            None => "",
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Claim({:?})", self.0)
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key(), self.value())
    }
}

/// A role held on a resource: a type, a permission set and claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub role_type: RoleType,
    pub permissions: Permission,
    pub claims: Vec<Claim>,
}

impl Role {
    pub fn new(role_type: RoleType, permissions: Permission) -> Self {
        Self {
            role_type,
            permissions,
            claims: Vec::new(),
        }
    }

    /// Role identity used by access checks: type and permissions, not claims.
    pub fn matches(&self, other: &Role) -> bool {
        self.role_type == other.role_type && self.permissions == other.permissions
    }

    /// True if every requested permission bit is granted.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    pub fn list_permissions(&self) -> Vec<&'static str> {
        self.permissions.names()
    }

    /// Add a claim unless one with the same key exists.
    ///
    /// Returns whether the claim was added.
    pub fn add_claim(&mut self, key: &str, value: &str) -> Result<bool> {
        if self.has_claim(key) {
            return Ok(false);
        }
        self.claims.push(Claim::new(key, value)?);
        Ok(true)
    }

    /// Builder form of [`Role::add_claim`].
    pub fn with_claim(mut self, key: &str, value: &str) -> Result<Self> {
        self.add_claim(key, value)?;
        Ok(self)
    }

    pub fn has_claim(&self, key: &str) -> bool {
        self.claims.iter().any(|c| c.key() == key)
    }

    pub fn get_claim(&self, key: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.key() == key)
    }

    /// Replace the claim sharing `claim`'s key, in place.
    ///
    /// Returns false if no claim has that key.
    pub fn replace_claim(&mut self, claim: Claim) -> bool {
        match self.claims.iter_mut().find(|c| c.key() == claim.key()) {
            Some(slot) => {
                *slot = claim;
                true
            }
            None => false,
        }
    }

    /// Remove the first claim with `key`.
    pub fn delete_claim(&mut self, key: &str) -> Option<Claim> {
        let idx = self.claims.iter().position(|c| c.key() == key)?;
        Some(self.claims.remove(idx))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "role: {}, permissions: [{}], claims: [",
            self.role_type,
            self.list_permissions().join(", ")
        )?;
        for (i, claim) in self.claims.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{claim}")?;
        }
        f.write_str("]")
    }
}

/// The predefined role presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultRole {
    Owner,
    Admin,
    Dev,
    Mod,
    Guest,
    User,
}

impl DefaultRole {
    pub const ALL: [DefaultRole; 6] = [
        DefaultRole::Owner,
        DefaultRole::Admin,
        DefaultRole::Dev,
        DefaultRole::Mod,
        DefaultRole::Guest,
        DefaultRole::User,
    ];

    pub fn role_type(self) -> RoleType {
        match self {
            DefaultRole::Owner => RoleType::OWNER,
            DefaultRole::Admin => RoleType::ADMIN,
            DefaultRole::Dev => RoleType::DEV,
            DefaultRole::Mod => RoleType::MOD,
            DefaultRole::Guest => RoleType::GUEST,
            DefaultRole::User => RoleType::USER,
        }
    }

    pub fn permissions(self) -> Permission {
        match self {
            DefaultRole::Owner | DefaultRole::Admin | DefaultRole::Dev => Permission::ALL,
            DefaultRole::Mod => Permission::READ | Permission::EDIT,
            DefaultRole::Guest | DefaultRole::User => Permission::READ,
        }
    }

    /// The preset as a claim-free [`Role`].
    pub fn role(self) -> Role {
        Role::new(self.role_type(), self.permissions())
    }

    /// Look up the preset for a role type.
    pub fn from_role_type(role_type: &RoleType) -> Option<Self> {
        Self::ALL.into_iter().find(|d| &d.role_type() == role_type)
    }
}

impl From<DefaultRole> for Role {
    fn from(preset: DefaultRole) -> Self {
        preset.role()
    }
}
