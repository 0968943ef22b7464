//! Permission catalog: the registry of known `(resource, action)` pairs.
//!
//! The catalog documents what exists. It is advisory: roles carry their own
//! permission copies and are never checked against it.

use crate::ordered::OrderedMap;
use crate::{Action, Permission, PermissionKey};

#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    entries: OrderedMap<PermissionKey, Permission>,
}

impl PermissionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts by `(resource, action)`. Returns the entry it replaced, if any.
    pub fn register(&mut self, permission: Permission) -> Option<Permission> {
        self.entries.upsert(permission.key(), permission)
    }

    pub fn get(&self, resource: &str, action: Action) -> Option<&Permission> {
        self.entries.get(&PermissionKey::new(resource, action))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
