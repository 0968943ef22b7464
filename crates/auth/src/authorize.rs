//! Permission resolution over roles, assignments and request context.
//!
//! - No IO
//! - No panics
//! - Total: unknown actors, dangling role names and missing context resolve
//!   toward "denied" instead of failing

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use warden_core::{ActorId, Attributes};

use crate::{Action, AssignmentStore, Permission, PermissionKey, Role, RoleStore};

/// Evaluates a permission's conditions against the caller's request context.
///
/// Returns `true` when the permission has no conditions. Otherwise every
/// condition key must appear in `context` with a strictly equal value.
///
/// **Policy note:** when the permission *has* conditions but the caller passes
/// no context at all (`None`), the check is permissive and returns `true`.
/// Callers opt out of attribute checks by omission. An empty context
/// (`Some(&Attributes::new())`) is not the same thing: it fails any
/// non-empty condition set. Middleware that wants attribute checks enforced
/// must always pass a context.
pub fn evaluate_conditions(conditions: Option<&Attributes>, context: Option<&Attributes>) -> bool {
    match (conditions, context) {
        (Some(conditions), Some(context)) => conditions.is_satisfied_by(context),
        _ => true,
    }
}

/// First permission in the role's *own* list that grants the request.
fn direct_grant<'r>(
    role: &'r Role,
    resource: &str,
    action: Action,
    context: Option<&Attributes>,
) -> Option<&'r Permission> {
    role.permissions
        .iter()
        .find(|p| p.matches(resource, action) && evaluate_conditions(p.conditions.as_ref(), context))
}

/// Roles behind the actor's active assignments, in assignment order.
fn active_roles<'s>(
    roles: &'s RoleStore,
    assignments: &'s AssignmentStore,
    user_id: &ActorId,
    at: DateTime<Utc>,
) -> Vec<&'s Role> {
    assignments
        .active_for_actor(user_id, at)
        .filter_map(|a| roles.get(&a.role_name))
        .collect()
}

/// How a grant reached the actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrantPath {
    /// The permission is in an assigned role's own list.
    Direct,
    /// The permission is in a role inherited by the assigned role `via`.
    Inherited { via: String },
}

/// The role and permission that satisfied a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub role: String,
    pub path: GrantPath,
    pub permission: Permission,
}

/// Runs the decision procedure and reports the first grant found.
///
/// Direct permissions of every active role are searched before any inherited
/// role. Inheritance is followed exactly one level: an inherited role's own
/// `inherits` list is ignored. The outcome is a pure OR over that search
/// space, so the order only decides *which* grant is reported.
pub(crate) fn resolve(
    roles: &RoleStore,
    assignments: &AssignmentStore,
    user_id: &ActorId,
    resource: &str,
    action: Action,
    context: Option<&Attributes>,
    at: DateTime<Utc>,
) -> Option<Grant> {
    let active = active_roles(roles, assignments, user_id, at);

    for role in &active {
        if let Some(permission) = direct_grant(role, resource, action, context) {
            return Some(Grant {
                role: role.name.clone(),
                path: GrantPath::Direct,
                permission: permission.clone(),
            });
        }
    }

    for role in &active {
        for parent in role.inherited_names().filter_map(|name| roles.get(name)) {
            if let Some(permission) = direct_grant(parent, resource, action, context) {
                return Some(Grant {
                    role: parent.name.clone(),
                    path: GrantPath::Inherited {
                        via: role.name.clone(),
                    },
                    permission: permission.clone(),
                });
            }
        }
    }

    None
}

/// Union of directly granted permissions across active roles and their one
/// level of inherited roles, deduplicated by `(resource, action)`.
///
/// The first occurrence of a key wins. Each active role is visited before its
/// inherited roles, in assignment order.
pub(crate) fn effective_permissions(
    roles: &RoleStore,
    assignments: &AssignmentStore,
    user_id: &ActorId,
    at: DateTime<Utc>,
) -> Vec<Permission> {
    let mut seen: HashSet<PermissionKey> = HashSet::new();
    let mut out = Vec::new();

    for role in active_roles(roles, assignments, user_id, at) {
        let inherited = role.inherited_names().filter_map(|name| roles.get(name));
        for source in std::iter::once(role).chain(inherited) {
            for permission in &source.permissions {
                if seen.insert(permission.key()) {
                    out.push(permission.clone());
                }
            }
        }
    }

    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub user_id: ActorId,
    pub resource: String,
    pub action: Action,
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Names of the actor's active, resolvable roles at evaluation time.
    pub active_roles: Vec<String>,

    pub grant: Option<Grant>,
    pub denial: Option<DenialKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// The actor holds no active, resolvable role.
    NoActiveRoles,
    /// Active roles exist but none (nor their inherited roles) grant the request.
    MissingPermission,
}

pub(crate) fn explain(
    roles: &RoleStore,
    assignments: &AssignmentStore,
    user_id: &ActorId,
    resource: &str,
    action: Action,
    context: Option<&Attributes>,
    at: DateTime<Utc>,
) -> AuthorizationExplanation {
    let active_roles: Vec<String> = active_roles(roles, assignments, user_id, at)
        .into_iter()
        .map(|r| r.name.clone())
        .collect();
    let grant = resolve(roles, assignments, user_id, resource, action, context, at);

    let (reason, denial) = match &grant {
        Some(Grant {
            role,
            path: GrantPath::Direct,
            ..
        }) => (format!("granted directly by role '{role}'"), None),
        Some(Grant {
            role,
            path: GrantPath::Inherited { via },
            ..
        }) => (
            format!("granted by role '{role}', inherited through '{via}'"),
            None,
        ),
        None if active_roles.is_empty() => (
            format!("actor '{user_id}' holds no active role"),
            Some(DenialKind::NoActiveRoles),
        ),
        None => (
            format!("no active role grants '{resource}:{action}'. Active roles: {active_roles:?}"),
            Some(DenialKind::MissingPermission),
        ),
    };

    AuthorizationExplanation {
        user_id: user_id.clone(),
        resource: resource.to_string(),
        action,
        granted: grant.is_some(),
        reason,
        active_roles,
        grant,
        denial,
    }
}
