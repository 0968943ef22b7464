//! Assignment store: per-actor lists of role grants.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use warden_core::ActorId;

use crate::RoleAssignment;

#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    by_actor: HashMap<ActorId, Vec<RoleAssignment>>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends without deduplication; the actor's list is created lazily.
    pub fn push(&mut self, assignment: RoleAssignment) {
        self.by_actor
            .entry(assignment.user_id.clone())
            .or_default()
            .push(assignment);
    }

    /// Removes every assignment of `role_name` held by `user_id`.
    pub fn remove(&mut self, user_id: &ActorId, role_name: &str) -> usize {
        let Some(list) = self.by_actor.get_mut(user_id) else {
            return 0;
        };
        let before = list.len();
        list.retain(|a| a.role_name != role_name);
        before - list.len()
    }

    /// Removes every assignment of `role_name` across all actors.
    pub fn revoke_everywhere(&mut self, role_name: &str) -> usize {
        self.by_actor
            .values_mut()
            .map(|list| {
                let before = list.len();
                list.retain(|a| a.role_name != role_name);
                before - list.len()
            })
            .sum()
    }

    pub fn for_actor(&self, user_id: &ActorId) -> &[RoleAssignment] {
        self.by_actor
            .get(user_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn active_for_actor(
        &self,
        user_id: &ActorId,
        at: DateTime<Utc>,
    ) -> impl Iterator<Item = &RoleAssignment> {
        self.for_actor(user_id)
            .iter()
            .filter(move |a| a.is_active_at(at))
    }

    /// Total assignments summed across all actors.
    pub fn total(&self) -> usize {
        self.by_actor.values().map(Vec::len).sum()
    }

    /// Owned, key-ordered copy of every actor's list.
    pub fn to_map(&self) -> BTreeMap<ActorId, Vec<RoleAssignment>> {
        self.by_actor
            .iter()
            .map(|(actor, list)| (actor.clone(), list.clone()))
            .collect()
    }

    pub fn replace_all(&mut self, by_actor: BTreeMap<ActorId, Vec<RoleAssignment>>) {
        self.by_actor = by_actor.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.by_actor.clear();
    }
}
