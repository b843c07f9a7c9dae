//! Resources and the per-identity resource set carried in a token body.

use serde::{Deserialize, Serialize};

use crate::registry::{ResourceType, RoleType};
use crate::role::Role;
use crate::types::{ResourceId, UserId};

/// A protected object of a given type and the roles held on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub res_id: ResourceId,
    pub resource_type: ResourceType,
    pub roles: Vec<Role>,
}

impl Resource {
    /// Create a resource with a fresh random id.
    pub fn new(resource_type: ResourceType, roles: impl IntoIterator<Item = Role>) -> Self {
        let mut resource = Self::with_id(ResourceId::generate(), resource_type);
        resource.assign_roles(roles);
        resource
    }

    /// Create a resource with a known id and no roles.
    pub fn with_id(res_id: ResourceId, resource_type: ResourceType) -> Self {
        Self {
            res_id,
            resource_type,
            roles: Vec::new(),
        }
    }

    /// Append roles that are not already held.
    pub fn assign_roles(&mut self, roles: impl IntoIterator<Item = Role>) {
        for role in roles {
            if !self.has_role(&role) {
                self.roles.push(role);
            }
        }
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r.matches(role))
    }

    /// Replace the matching role (e.g. to update its claims), or append it.
    pub fn update_role(&mut self, role: Role) {
        match self.roles.iter_mut().find(|r| r.matches(&role)) {
            Some(slot) => *slot = role,
            None => self.roles.push(role),
        }
    }

    /// Remove the first matching role.
    pub fn remove_role(&mut self, role: &Role) -> Option<Role> {
        let idx = self.roles.iter().position(|r| r.matches(role))?;
        Some(self.roles.remove(idx))
    }

    pub fn roles_by_type(&self, role_type: &RoleType) -> Vec<&Role> {
        self.roles
            .iter()
            .filter(|r| &r.role_type == role_type)
            .collect()
    }
}

/// All resources an identity holds roles on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub user_id: UserId,
    pub resources: Vec<Resource>,
}

impl Resources {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            resources: Vec::new(),
        }
    }

    /// Append a resource.
    pub fn insert(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    /// Builder form of [`Resources::insert`].
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.insert(resource);
        self
    }

    /// Merge `incoming`'s roles into every existing resource of its type.
    ///
    /// Roles already held are skipped. If no resource of that type exists,
    /// nothing is created; use [`Resources::insert`] for that.
    pub fn add_resource(&mut self, incoming: Resource) {
        for resource in self
            .resources
            .iter_mut()
            .filter(|r| r.resource_type == incoming.resource_type)
        {
            resource.assign_roles(incoming.roles.iter().cloned());
        }
    }

    pub fn get_resource_by_id(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| &r.res_id == id)
    }

    pub fn get_resource_by_id_mut(&mut self, id: &ResourceId) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| &r.res_id == id)
    }

    pub fn get_resources_by_type(&self, resource_type: &ResourceType) -> Vec<&Resource> {
        self.resources
            .iter()
            .filter(|r| &r.resource_type == resource_type)
            .collect()
    }

    /// Remove every resource with `id`. Returns how many were removed.
    pub fn remove_resource_by_id(&mut self, id: &ResourceId) -> usize {
        let before = self.resources.len();
        self.resources.retain(|r| &r.res_id != id);
        before - self.resources.len()
    }

    /// Remove every resource of `resource_type`. Returns how many were removed.
    pub fn remove_resource_by_type(&mut self, resource_type: &ResourceType) -> usize {
        let before = self.resources.len();
        self.resources.retain(|r| &r.resource_type != resource_type);
        before - self.resources.len()
    }

    /// True if any resource of `resource_type` holds a role matching any of
    /// `roles` (same type and permissions).
    pub fn has_access(&self, resource_type: &ResourceType, roles: &[Role]) -> bool {
        self.resources
            .iter()
            .filter(|r| &r.resource_type == resource_type)
            .any(|r| roles.iter().any(|role| r.has_role(role)))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }
}

impl<'a> IntoIterator for &'a Resources {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}
