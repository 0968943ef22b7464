//! Role store: named role definitions, keyed by unique name.

use warden_core::{Entity, RbacError, RbacResult};

use crate::ordered::OrderedMap;
use crate::{Role, RoleUpdate};

#[derive(Debug, Clone, Default)]
pub struct RoleStore {
    roles: OrderedMap<String, Role>,
}

impl RoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts by name with full-replace semantics. Returns the replaced role.
    pub fn define(&mut self, role: Role) -> Option<Role> {
        self.roles.upsert(role.id().to_string(), role)
    }

    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn update(&mut self, name: &str, update: RoleUpdate) -> RbacResult<Role> {
        let role = self
            .roles
            .get_mut(name)
            .ok_or_else(|| RbacError::role_not_found(name))?;
        role.merge(update);
        Ok(role.clone())
    }

    /// Removes the role without any protection check; callers enforce policy.
    pub fn remove(&mut self, name: &str) -> Option<Role> {
        self.roles.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.roles.clear();
    }
}
