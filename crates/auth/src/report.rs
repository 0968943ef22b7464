//! Reporting and snapshot views of registry state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use warden_core::ActorId;

use crate::{Permission, Role, RoleAssignment};

/// Aggregate counts over the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_roles: usize,
    pub total_permissions: usize,
    /// Summed across all actors, active and expired alike.
    pub total_assignments: usize,
    /// Role count per `metadata.level`; roles without metadata count as level 0.
    pub roles_by_level: BTreeMap<u32, usize>,
}

/// Owned copy of the complete registry state.
///
/// Nothing in the engine writes this anywhere; persisting it is up to the
/// caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub user_roles: BTreeMap<ActorId, Vec<RoleAssignment>>,
}

pub(crate) fn level_histogram<'a>(roles: impl IntoIterator<Item = &'a Role>) -> BTreeMap<u32, usize> {
    let mut histogram = BTreeMap::new();
    for role in roles {
        *histogram.entry(role.level()).or_insert(0) += 1;
    }
    histogram
}
