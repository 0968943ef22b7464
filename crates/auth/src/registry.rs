//! The authorization registry: owns the three stores and answers decisions.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use warden_core::{ActorId, Attributes, Clock, RbacError, RbacResult, SystemClock};

use crate::authorize::{self, AuthorizationExplanation};
use crate::config::{ConfigError, PolicyDocument, RegistryConfig};
use crate::defaults::{default_permissions, default_roles};
use crate::report::{level_histogram, RegistrySnapshot, RegistryStats};
use crate::{
    Action, AssignOptions, AssignmentStore, Permission, PermissionCatalog, Role, RoleAssignment,
    RoleOptions, RoleStore, RoleUpdate, SUPER_ADMIN,
};

/// Outcome of [`AuthorizationRegistry::delete_role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleDeletion {
    /// False when the role did not exist (a no-op, not an error).
    pub removed: bool,
    /// Assignments removed across all actors by the cascade.
    pub revoked_assignments: usize,
}

#[derive(Debug, Default)]
struct RegistryState {
    catalog: PermissionCatalog,
    roles: RoleStore,
    assignments: AssignmentStore,
}

impl RegistryState {
    fn bootstrap(&mut self) {
        let catalog = default_permissions();
        for role in default_roles(&catalog) {
            self.roles.define(role);
        }
        for permission in catalog {
            self.catalog.register(permission);
        }
    }

    fn clear(&mut self) {
        self.catalog.clear();
        self.roles.clear();
        self.assignments.clear();
    }
}

/// In-memory RBAC engine.
///
/// Construct one at startup and share it (`&` or `Arc`) with every consumer.
/// All stores sit behind one lock: decisions take the read side once per
/// call and mutators take the write side once per call, so a `delete_role`
/// cascade is atomic with respect to concurrent `assign_role` calls.
///
/// Decisions are total: unknown actors, dangling role references and missing
/// context resolve toward `false` and never return errors.
pub struct AuthorizationRegistry {
    state: RwLock<RegistryState>,
    clock: Arc<dyn Clock>,
}

impl Default for AuthorizationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for AuthorizationRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.read();
        f.debug_struct("AuthorizationRegistry")
            .field("roles", &state.roles.len())
            .field("permissions", &state.catalog.len())
            .field("assignments", &state.assignments.total())
            .finish_non_exhaustive()
    }
}

impl AuthorizationRegistry {
    /// Registry with the default policy installed, on wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Registry with the default policy installed.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let registry = Self::empty(clock);
        registry.write().bootstrap();
        registry
    }

    /// Registry with no roles, permissions or assignments.
    pub fn empty(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            clock,
        }
    }

    /// Assembles a registry from startup configuration.
    pub fn from_config(config: &RegistryConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        let registry = if config.bootstrap_defaults {
            Self::with_clock(clock)
        } else {
            Self::empty(clock)
        };

        if let Some(path) = &config.policy_path {
            let document = PolicyDocument::from_path(path)?;
            registry.load_policy(&document)?;
            tracing::info!(path = %path.display(), "policy document loaded");
        }

        Ok(registry)
    }

    // Poisoned locks are recovered; store mutations cannot panic midway.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission catalog
    // ─────────────────────────────────────────────────────────────────────────

    /// Upserts a catalog entry by `(resource, action)`. Roles are not touched.
    pub fn register_permission(&self, permission: Permission) {
        tracing::debug!(permission = %permission, "permission registered");
        self.write().catalog.register(permission);
    }

    pub fn get_permission(&self, resource: &str, action: Action) -> Option<Permission> {
        self.read().catalog.get(resource, action).cloned()
    }

    pub fn get_all_permissions(&self) -> Vec<Permission> {
        self.read().catalog.iter().cloned().collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Role store
    // ─────────────────────────────────────────────────────────────────────────

    /// Upserts a role by name, fully replacing any previous definition.
    pub fn define_role(&self, role: Role) {
        let name = role.name.clone();
        let replaced = self.write().roles.define(role).is_some();
        tracing::info!(role = %name, replaced, "role defined");
    }

    pub fn create_role(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: Vec<Permission>,
        options: RoleOptions,
    ) -> Role {
        let role = Role::new(name, description, permissions).with_options(options);
        self.define_role(role.clone());
        role
    }

    /// Shallow-merges the supplied fields into an existing role.
    pub fn update_role(&self, name: &str, update: RoleUpdate) -> RbacResult<Role> {
        let result = self.write().roles.update(name, update);
        match &result {
            Ok(_) => tracing::info!(role = %name, "role updated"),
            Err(e) => tracing::warn!(role = %name, error = %e, "role update rejected"),
        }
        result
    }

    /// Deletes a role and cascades to every assignment referencing it.
    ///
    /// `super_admin` can never be deleted. Deleting an unknown role is a no-op.
    pub fn delete_role(&self, name: &str) -> RbacResult<RoleDeletion> {
        if name == SUPER_ADMIN {
            tracing::warn!(role = %name, "refused to delete protected role");
            return Err(RbacError::protected_role(name));
        }

        let mut state = self.write();
        if state.roles.remove(name).is_none() {
            return Ok(RoleDeletion {
                removed: false,
                revoked_assignments: 0,
            });
        }
        let revoked_assignments = state.assignments.revoke_everywhere(name);
        drop(state);

        tracing::info!(role = %name, revoked_assignments, "role deleted");
        Ok(RoleDeletion {
            removed: true,
            revoked_assignments,
        })
    }

    pub fn get_role(&self, name: &str) -> Option<Role> {
        self.read().roles.get(name).cloned()
    }

    pub fn get_all_roles(&self) -> Vec<Role> {
        self.read().roles.iter().cloned().collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Assignment store
    // ─────────────────────────────────────────────────────────────────────────

    /// Grants a defined role to an actor. Identical grants are not deduplicated.
    pub fn assign_role(
        &self,
        user_id: impl Into<ActorId>,
        role_name: &str,
        options: AssignOptions,
    ) -> RbacResult<RoleAssignment> {
        let user_id = user_id.into();
        let mut state = self.write();

        if !state.roles.contains(role_name) {
            drop(state);
            tracing::warn!(user_id = %user_id, role = %role_name, "assignment to unknown role rejected");
            return Err(RbacError::role_not_found(role_name));
        }

        let AssignOptions {
            granted_by,
            expires_at,
            metadata,
        } = options;
        let assignment = RoleAssignment {
            user_id,
            role_name: role_name.to_string(),
            granted_by,
            granted_at: self.clock.now(),
            expires_at,
            metadata,
        };
        state.assignments.push(assignment.clone());
        drop(state);

        tracing::info!(
            user_id = %assignment.user_id,
            role = %assignment.role_name,
            expires_at = ?assignment.expires_at,
            "role assigned"
        );
        Ok(assignment)
    }

    /// Removes every grant of `role_name` held by the actor.
    pub fn remove_role(&self, user_id: &ActorId, role_name: &str) -> bool {
        let removed = self.write().assignments.remove(user_id, role_name);
        if removed > 0 {
            tracing::info!(user_id = %user_id, role = %role_name, removed, "role removed");
        }
        removed > 0
    }

    /// All grants held by the actor, expired ones included.
    pub fn get_user_roles(&self, user_id: &ActorId) -> Vec<RoleAssignment> {
        self.read().assignments.for_actor(user_id).to_vec()
    }

    /// Grants active at `at`, or at the registry clock's current instant.
    pub fn get_active_user_roles(
        &self,
        user_id: &ActorId,
        at: Option<DateTime<Utc>>,
    ) -> Vec<RoleAssignment> {
        let at = at.unwrap_or_else(|| self.clock.now());
        self.read()
            .assignments
            .active_for_actor(user_id, at)
            .cloned()
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission resolver
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether the actor may perform `action` on `resource`.
    ///
    /// Searches the direct permissions of every active role, then the direct
    /// permissions of roles they inherit (one level, non-transitive).
    ///
    /// **Policy note:** a conditioned permission checked with `context: None`
    /// is granted; see [`authorize::evaluate_conditions`].
    pub fn has_permission(
        &self,
        user_id: &ActorId,
        resource: &str,
        action: Action,
        context: Option<&Attributes>,
    ) -> bool {
        self.has_permission_at(user_id, resource, action, context, self.clock.now())
    }

    pub fn has_permission_at(
        &self,
        user_id: &ActorId,
        resource: &str,
        action: Action,
        context: Option<&Attributes>,
        at: DateTime<Utc>,
    ) -> bool {
        let state = self.read();
        let granted =
            authorize::resolve(&state.roles, &state.assignments, user_id, resource, action, context, at)
                .is_some();
        tracing::debug!(user_id = %user_id, resource, action = %action, granted, "permission check");
        granted
    }

    /// True if any of the `(resource, action)` pairs is granted; false for an
    /// empty list. Every pair is evaluated at the same instant.
    pub fn has_any_permission(
        &self,
        user_id: &ActorId,
        permissions: &[(&str, Action)],
        context: Option<&Attributes>,
    ) -> bool {
        let at = self.clock.now();
        let state = self.read();
        permissions.iter().any(|&(resource, action)| {
            authorize::resolve(&state.roles, &state.assignments, user_id, resource, action, context, at)
                .is_some()
        })
    }

    /// True if every `(resource, action)` pair is granted; true for an empty
    /// list. Every pair is evaluated at the same instant.
    pub fn has_all_permissions(
        &self,
        user_id: &ActorId,
        permissions: &[(&str, Action)],
        context: Option<&Attributes>,
    ) -> bool {
        let at = self.clock.now();
        let state = self.read();
        permissions.iter().all(|&(resource, action)| {
            authorize::resolve(&state.roles, &state.assignments, user_id, resource, action, context, at)
                .is_some()
        })
    }

    /// Effective permissions, deduplicated by `(resource, action)`.
    pub fn get_user_permissions(&self, user_id: &ActorId) -> Vec<Permission> {
        self.get_user_permissions_at(user_id, self.clock.now())
    }

    pub fn get_user_permissions_at(&self, user_id: &ActorId, at: DateTime<Utc>) -> Vec<Permission> {
        let state = self.read();
        authorize::effective_permissions(&state.roles, &state.assignments, user_id, at)
    }

    /// Same decision as [`Self::has_permission`], with the granting role.
    pub fn explain_permission(
        &self,
        user_id: &ActorId,
        resource: &str,
        action: Action,
        context: Option<&Attributes>,
    ) -> AuthorizationExplanation {
        self.explain_permission_at(user_id, resource, action, context, self.clock.now())
    }

    pub fn explain_permission_at(
        &self,
        user_id: &ActorId,
        resource: &str,
        action: Action,
        context: Option<&Attributes>,
        at: DateTime<Utc>,
    ) -> AuthorizationExplanation {
        let state = self.read();
        authorize::explain(&state.roles, &state.assignments, user_id, resource, action, context, at)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reporting, snapshots, policy loading
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get_stats(&self) -> RegistryStats {
        let state = self.read();
        RegistryStats {
            total_roles: state.roles.len(),
            total_permissions: state.catalog.len(),
            total_assignments: state.assignments.total(),
            roles_by_level: level_histogram(state.roles.iter()),
        }
    }

    pub fn export(&self) -> RegistrySnapshot {
        let state = self.read();
        RegistrySnapshot {
            roles: state.roles.iter().cloned().collect(),
            permissions: state.catalog.iter().cloned().collect(),
            user_roles: state.assignments.to_map(),
        }
    }

    /// Replaces all state with `snapshot`.
    ///
    /// `super_admin` survives a snapshot that omits it: the current definition
    /// is carried over. Assignments are not validated against the restored
    /// roles; dangling names are skipped at decision time like any other.
    pub fn restore(&self, snapshot: RegistrySnapshot) {
        let RegistrySnapshot {
            roles,
            permissions,
            user_roles,
        } = snapshot;

        let mut state = self.write();
        let carried = if roles.iter().any(Role::is_protected) {
            None
        } else {
            state.roles.get(SUPER_ADMIN).cloned()
        };
        state.clear();
        if let Some(role) = carried {
            tracing::warn!(role = %role.name, "snapshot omits protected role; keeping current definition");
            state.roles.define(role);
        }
        for role in roles {
            state.roles.define(role);
        }
        for permission in permissions {
            state.catalog.register(permission);
        }
        state.assignments.replace_all(user_roles);
        let (roles, assignments) = (state.roles.len(), state.assignments.total());
        drop(state);

        tracing::info!(roles, assignments, "registry restored from snapshot");
    }

    /// Discards all state and reinstalls the default policy. Meant for tests.
    pub fn clear(&self) {
        let mut state = self.write();
        state.clear();
        state.bootstrap();
        drop(state);
        tracing::info!("registry reset to default policy");
    }

    /// Applies a declarative policy: permissions, then roles, then grants.
    ///
    /// Nothing is applied when a grant names a role that is neither defined
    /// already nor in the document. Returns the number of grants created.
    pub fn load_policy(&self, document: &PolicyDocument) -> RbacResult<usize> {
        let now = self.clock.now();
        let mut state = self.write();

        let unknown = document.assignments.iter().find(|a| {
            !state.roles.contains(&a.role_name) && !document.roles.iter().any(|r| r.name == a.role_name)
        });
        if let Some(assignment) = unknown {
            return Err(RbacError::role_not_found(assignment.role_name.clone()));
        }

        for permission in &document.permissions {
            state.catalog.register(permission.clone());
        }
        for role in &document.roles {
            state.roles.define(role.clone());
        }
        for a in &document.assignments {
            state.assignments.push(RoleAssignment {
                user_id: a.user_id.clone(),
                role_name: a.role_name.clone(),
                granted_by: a.granted_by.clone(),
                granted_at: now,
                expires_at: a.expires_at,
                metadata: a.metadata.clone(),
            });
        }
        drop(state);

        tracing::info!(
            permissions = document.permissions.len(),
            roles = document.roles.len(),
            assignments = document.assignments.len(),
            "policy applied"
        );
        Ok(document.assignments.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::defaults::{ADMIN, GUEST, MANAGER, USER};
    use warden_core::ManualClock;

    fn setup() -> (AuthorizationRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let registry = AuthorizationRegistry::with_clock(clock.clone());
        (registry, clock)
    }

    fn editor(registry: &AuthorizationRegistry) -> Role {
        registry.create_role(
            "editor",
            "Edits documents",
            vec![Permission::new("docs", Action::Update)],
            RoleOptions::default().level(30),
        )
    }

    #[test]
    fn actor_without_assignments_is_denied_everything() {
        let (registry, _) = setup();
        let nobody = ActorId::from("nobody");
        for permission in default_permissions() {
            assert!(!registry.has_permission(&nobody, &permission.resource, permission.action, None));
        }
        assert!(registry.get_user_permissions(&nobody).is_empty());
    }

    #[test]
    fn super_admin_holds_every_default_permission() {
        let (registry, _) = setup();
        registry.assign_role("root", SUPER_ADMIN, AssignOptions::default()).unwrap();
        let root = ActorId::from("root");

        for permission in default_permissions() {
            assert!(registry.has_permission(&root, &permission.resource, permission.action, None));
        }
    }

    #[test]
    fn editor_can_update_but_not_delete_docs() {
        let (registry, _) = setup();
        editor(&registry);
        registry.assign_role(42u64, "editor", AssignOptions::default()).unwrap();

        let actor = ActorId::from(42u64);
        assert!(registry.has_permission(&actor, "docs", Action::Update, None));
        assert!(!registry.has_permission(&actor, "docs", Action::Delete, None));
    }

    #[test]
    fn expired_assignment_grants_nothing() {
        let (registry, clock) = setup();
        editor(&registry);
        let actor = ActorId::from("temp");
        registry
            .assign_role(
                actor.clone(),
                "editor",
                AssignOptions::default().expires_at(clock.now() - Duration::minutes(1)),
            )
            .unwrap();

        assert!(registry.get_active_user_roles(&actor, None).is_empty());
        assert_eq!(registry.get_user_roles(&actor).len(), 1);
        assert!(!registry.has_permission(&actor, "docs", Action::Update, None));
    }

    #[test]
    fn assignment_lapses_when_clock_passes_expiry() {
        let (registry, clock) = setup();
        editor(&registry);
        let actor = ActorId::from("contractor");
        let expires_at = clock.now() + Duration::hours(8);
        registry
            .assign_role(actor.clone(), "editor", AssignOptions::default().expires_at(expires_at))
            .unwrap();

        assert!(registry.has_permission(&actor, "docs", Action::Update, None));
        assert!(!registry.has_permission_at(&actor, "docs", Action::Update, None, expires_at));

        clock.advance(Duration::hours(9));
        assert!(!registry.has_permission(&actor, "docs", Action::Update, None));
        assert_eq!(
            registry.get_active_user_roles(&actor, Some(expires_at - Duration::hours(1))).len(),
            1
        );
    }

    #[test]
    fn super_admin_cannot_be_deleted() {
        let (registry, _) = setup();
        registry.assign_role("root", SUPER_ADMIN, AssignOptions::default()).unwrap();
        let before = registry.export();

        let err = registry.delete_role(SUPER_ADMIN).unwrap_err();
        assert_eq!(err, RbacError::ProtectedRole(SUPER_ADMIN.into()));
        assert_eq!(registry.export(), before);
    }

    #[test]
    fn delete_role_cascades_to_assignments() {
        let (registry, _) = setup();
        editor(&registry);
        let alice = ActorId::from("alice");
        let bob = ActorId::from("bob");
        registry.assign_role(alice.clone(), "editor", AssignOptions::default()).unwrap();
        registry.assign_role(alice.clone(), USER, AssignOptions::default()).unwrap();
        registry.assign_role(bob.clone(), "editor", AssignOptions::default()).unwrap();
        registry.assign_role(bob.clone(), "editor", AssignOptions::default()).unwrap();

        let deletion = registry.delete_role("editor").unwrap();
        assert_eq!(
            deletion,
            RoleDeletion {
                removed: true,
                revoked_assignments: 3
            }
        );

        assert!(registry.get_role("editor").is_none());
        assert!(registry.get_all_roles().iter().all(|r| r.name != "editor"));
        assert!(registry.get_user_roles(&bob).is_empty());
        assert_eq!(registry.get_user_roles(&alice).len(), 1);
        assert!(!registry.has_permission(&alice, "docs", Action::Update, None));
        assert!(registry.has_permission(&alice, "partners", Action::Read, None));
    }

    #[test]
    fn shared_grant_survives_deleting_one_source() {
        let (registry, _) = setup();
        registry.create_role(
            "reader",
            "",
            vec![Permission::new("partners", Action::Read)],
            RoleOptions::default(),
        );
        let carol = ActorId::from("carol");
        registry.assign_role(carol.clone(), "reader", AssignOptions::default()).unwrap();
        registry.assign_role(carol.clone(), GUEST, AssignOptions::default()).unwrap();

        registry.delete_role("reader").unwrap();
        assert!(registry.has_permission(&carol, "partners", Action::Read, None));
    }

    #[test]
    fn deleting_unknown_role_is_a_noop() {
        let (registry, _) = setup();
        let deletion = registry.delete_role("ghost").unwrap();
        assert!(!deletion.removed);
        assert_eq!(registry.get_all_roles().len(), 5);
    }

    #[test]
    fn assigning_unknown_role_fails_without_side_effects() {
        let (registry, _) = setup();
        let actor = ActorId::from("u");
        registry.assign_role(actor.clone(), USER, AssignOptions::default()).unwrap();

        let err = registry
            .assign_role(actor.clone(), "nonexistent-role", AssignOptions::default())
            .unwrap_err();
        assert_eq!(err, RbacError::RoleNotFound("nonexistent-role".into()));
        assert_eq!(registry.get_user_roles(&actor).len(), 1);
    }

    #[test]
    fn assignments_are_not_deduplicated_and_removed_together() {
        let (registry, clock) = setup();
        let actor = ActorId::from("dup");
        let first = registry
            .assign_role(actor.clone(), USER, AssignOptions::default().granted_by("admin-1"))
            .unwrap();
        registry.assign_role(actor.clone(), USER, AssignOptions::default()).unwrap();

        assert_eq!(first.granted_at, clock.now());
        assert_eq!(first.granted_by, Some(ActorId::from("admin-1")));
        assert_eq!(registry.get_user_roles(&actor).len(), 2);

        assert!(registry.remove_role(&actor, USER));
        assert!(registry.get_user_roles(&actor).is_empty());
        assert!(!registry.remove_role(&actor, USER));
    }

    #[test]
    fn update_role_merges_and_rejects_unknown() {
        let (registry, _) = setup();
        editor(&registry);

        let updated = registry
            .update_role(
                "editor",
                RoleUpdate {
                    permissions: Some(vec![
                        Permission::new("docs", Action::Update),
                        Permission::new("docs", Action::Delete),
                    ]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.description, "Edits documents");
        assert_eq!(updated.level(), 30);
        assert_eq!(registry.get_role("editor"), Some(updated));

        let err = registry.update_role("ghost", RoleUpdate::default()).unwrap_err();
        assert_eq!(err, RbacError::RoleNotFound("ghost".into()));
    }

    #[test]
    fn redefining_a_role_replaces_it_in_place() {
        let (registry, _) = setup();
        registry.define_role(Role::new(MANAGER, "Slimmed down", vec![]));

        let names: Vec<_> = registry.get_all_roles().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec![SUPER_ADMIN, ADMIN, MANAGER, USER, GUEST]);
        let manager = registry.get_role(MANAGER).unwrap();
        assert!(manager.permissions.is_empty());
        assert!(manager.metadata.is_none());
    }

    #[test]
    fn conditions_are_checked_against_context() {
        let (registry, _) = setup();
        registry.create_role(
            "owner",
            "Updates own docs",
            vec![Permission::new("docs", Action::Update).with_condition("ownerId", "u-7")],
            RoleOptions::default(),
        );
        let actor = ActorId::from("u-7");
        registry.assign_role(actor.clone(), "owner", AssignOptions::default()).unwrap();

        let own = Attributes::new().with("ownerId", "u-7");
        let other = Attributes::new().with("ownerId", "u-8");
        let typed_mismatch = Attributes::new().with("ownerId", 7);

        assert!(registry.has_permission(&actor, "docs", Action::Update, Some(&own)));
        assert!(!registry.has_permission(&actor, "docs", Action::Update, Some(&other)));
        assert!(!registry.has_permission(&actor, "docs", Action::Update, Some(&typed_mismatch)));
        assert!(!registry.has_permission(&actor, "docs", Action::Update, Some(&Attributes::new())));
        // Omitting the context skips attribute checks entirely.
        assert!(registry.has_permission(&actor, "docs", Action::Update, None));
    }

    #[test]
    fn inherited_roles_grant_one_level_deep() {
        let (registry, _) = setup();
        registry.create_role(
            "team_lead",
            "Leads a team",
            vec![Permission::new("timesheets", Action::Update)],
            RoleOptions::default().inherits([USER]),
        );
        registry.create_role("director", "", vec![], RoleOptions::default().inherits(["team_lead"]));

        let lead = ActorId::from("lead");
        let director = ActorId::from("director");
        registry.assign_role(lead.clone(), "team_lead", AssignOptions::default()).unwrap();
        registry.assign_role(director.clone(), "director", AssignOptions::default()).unwrap();

        assert!(registry.has_permission(&lead, "partners", Action::List, None));
        assert!(registry.has_permission(&director, "timesheets", Action::Update, None));
        assert!(!registry.has_permission(&director, "partners", Action::List, None));

        let explanation = registry.explain_permission(&lead, "partners", Action::List, None);
        assert_eq!(
            explanation.grant.map(|g| (g.role, g.path)),
            Some((USER.to_string(), authorize::GrantPath::Inherited { via: "team_lead".into() }))
        );
    }

    #[test]
    fn user_permissions_are_deduplicated_by_key() {
        let (registry, _) = setup();
        registry.create_role(
            "partner_reader",
            "",
            vec![
                Permission::new("partners", Action::Read).with_description("duplicate"),
                Permission::new("partners", Action::Export),
            ],
            RoleOptions::default().inherits([GUEST]),
        );
        let actor = ActorId::from("reader");
        registry.assign_role(actor.clone(), USER, AssignOptions::default()).unwrap();
        registry.assign_role(actor.clone(), "partner_reader", AssignOptions::default()).unwrap();

        let permissions = registry.get_user_permissions(&actor);
        let keys: Vec<_> = permissions.iter().map(|p| p.key().to_string()).collect();
        assert_eq!(keys, vec!["partners:read", "partners:list", "partners:export"]);
        assert_ne!(permissions[0].description.as_deref(), Some("duplicate"));
    }

    #[test]
    fn bulk_checks_match_single_checks() {
        let (registry, _) = setup();
        let actor = ActorId::from("g");
        registry.assign_role(actor.clone(), GUEST, AssignOptions::default()).unwrap();

        let read = ("partners", Action::Read);
        let delete = ("partners", Action::Delete);
        assert!(registry.has_any_permission(&actor, &[read, delete], None));
        assert!(!registry.has_all_permissions(&actor, &[read, delete], None));
        assert!(registry.has_all_permissions(&actor, &[read], None));
        assert!(!registry.has_any_permission(&actor, &[], None));
        assert!(registry.has_all_permissions(&actor, &[], None));
    }

    #[test]
    fn stats_count_roles_permissions_and_assignments() {
        let (registry, _) = setup();
        editor(&registry);
        registry.assign_role("a", USER, AssignOptions::default()).unwrap();
        registry.assign_role("b", USER, AssignOptions::default()).unwrap();
        registry.assign_role("b", "editor", AssignOptions::default()).unwrap();

        let stats = registry.get_stats();
        assert_eq!(stats.total_roles, 6);
        assert_eq!(stats.total_permissions, 26);
        assert_eq!(stats.total_assignments, 3);
        assert_eq!(
            stats.roles_by_level.into_iter().collect::<Vec<_>>(),
            vec![(20, 1), (30, 1), (40, 1), (60, 1), (80, 1), (100, 1)]
        );
    }

    #[test]
    fn export_and_restore_round_trip_state() {
        let (registry, clock) = setup();
        editor(&registry);
        registry
            .assign_role(
                "alice",
                "editor",
                AssignOptions::default().expires_at(clock.now() + Duration::days(1)),
            )
            .unwrap();
        let snapshot = registry.export();
        assert_eq!(snapshot.roles.len(), 6);
        assert_eq!(snapshot.permissions.len(), 26);
        assert_eq!(snapshot.user_roles[&ActorId::from("alice")].len(), 1);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["userRoles"]["alice"][0]["roleName"], "editor");
        assert!(json["userRoles"]["alice"][0].get("expiresAt").is_some());

        let copy = AuthorizationRegistry::empty(clock.clone());
        copy.restore(serde_json::from_value(json).unwrap());
        assert_eq!(copy.export(), snapshot);
        assert!(copy.has_permission(&ActorId::from("alice"), "docs", Action::Update, None));
    }

    #[test]
    fn restore_keeps_super_admin_missing_from_snapshot() {
        let (registry, _) = setup();
        let before = registry.get_role(SUPER_ADMIN);
        assert!(before.is_some());

        registry.restore(RegistrySnapshot::default());
        assert_eq!(registry.get_role(SUPER_ADMIN), before);
        assert_eq!(registry.get_all_roles().len(), 1);
        assert!(registry.get_all_permissions().is_empty());

        let replacement = Role::new(SUPER_ADMIN, "Restored", vec![]);
        registry.restore(RegistrySnapshot {
            roles: vec![replacement.clone()],
            ..RegistrySnapshot::default()
        });
        assert_eq!(registry.get_role(SUPER_ADMIN), Some(replacement));
    }

    #[test]
    fn clear_restores_exactly_the_default_roles() {
        let (registry, _) = setup();
        editor(&registry);
        registry.delete_role(GUEST).unwrap();
        registry.assign_role("x", ADMIN, AssignOptions::default()).unwrap();
        registry.register_permission(Permission::new("docs", Action::Read));

        registry.clear();

        let catalog = default_permissions();
        assert_eq!(registry.get_all_roles(), default_roles(&catalog));
        assert_eq!(registry.get_all_permissions(), catalog);
        assert_eq!(registry.get_stats().total_assignments, 0);
    }

    #[test]
    fn catalog_is_advisory() {
        let (registry, _) = setup();
        registry.register_permission(Permission::new("docs", Action::Read).with_description("Read docs"));
        registry.create_role(
            "unlisted",
            "",
            vec![Permission::new("secrets", Action::Read)],
            RoleOptions::default(),
        );
        registry.assign_role("s", "unlisted", AssignOptions::default()).unwrap();

        assert!(registry.get_permission("secrets", Action::Read).is_none());
        assert!(registry.has_permission(&ActorId::from("s"), "secrets", Action::Read, None));
        assert_eq!(
            registry.get_permission("docs", Action::Read).and_then(|p| p.description),
            Some("Read docs".to_string())
        );
    }

    #[test]
    fn load_policy_is_all_or_nothing() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let registry = AuthorizationRegistry::empty(clock);

        let bad = PolicyDocument::from_json(
            r#"{ "roles": [{ "name": "viewer", "description": "", "permissions": [] }],
                 "assignments": [{ "userId": "1", "roleName": "viewer" },
                                 { "userId": "2", "roleName": "missing" }] }"#,
        )
        .unwrap();
        assert_eq!(
            registry.load_policy(&bad),
            Err(RbacError::RoleNotFound("missing".into()))
        );
        assert!(registry.get_all_roles().is_empty());

        let good = PolicyDocument::from_json(
            r#"{ "permissions": [{ "resource": "docs", "action": "read" }],
                 "roles": [{ "name": "viewer", "description": "",
                             "permissions": [{ "resource": "docs", "action": "read" }] }],
                 "assignments": [{ "userId": "1", "roleName": "viewer", "grantedBy": "ops" }] }"#,
        )
        .unwrap();
        assert_eq!(registry.load_policy(&good), Ok(1));
        assert!(registry.has_permission(&ActorId::from("1"), "docs", Action::Read, None));
        assert_eq!(registry.get_stats().total_permissions, 1);
    }

    #[test]
    fn from_config_without_defaults_starts_empty() {
        let config = RegistryConfig {
            bootstrap_defaults: false,
            policy_path: None,
        };
        let registry = AuthorizationRegistry::from_config(&config, Arc::new(SystemClock)).unwrap();
        assert_eq!(registry.get_stats().total_roles, 0);

        let registry =
            AuthorizationRegistry::from_config(&RegistryConfig::default(), Arc::new(SystemClock)).unwrap();
        assert_eq!(registry.get_stats().total_roles, 5);
    }
}
