//! Built-in bootstrap policy: the default catalog and the five default roles.
//!
//! The exact contents are a compatibility contract; consumers assume e.g. that
//! `user` can read and list partners and that `guest` can only read them.

use crate::{Action, Permission, Role, RoleOptions, SUPER_ADMIN};

pub const ADMIN: &str = "admin";
pub const MANAGER: &str = "manager";
pub const USER: &str = "user";
pub const GUEST: &str = "guest";

/// Resources and actions of the default catalog, in registration order.
const CATALOG: &[(&str, &[Action])] = &[
    (
        "users",
        &[Action::Create, Action::Read, Action::Update, Action::Delete, Action::List],
    ),
    (
        "companies",
        &[Action::Create, Action::Read, Action::Update, Action::Delete, Action::List],
    ),
    (
        "partners",
        &[
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::List,
            Action::Export,
            Action::Import,
        ],
    ),
    ("system", &[Action::Read, Action::Update]),
    ("reports", &[Action::Create, Action::Read, Action::List, Action::Export]),
    ("audit", &[Action::Read, Action::List, Action::Export]),
];

fn describe(resource: &str, action: Action) -> String {
    let verb = match action {
        Action::Create => "Create",
        Action::Read => "View",
        Action::Update => "Update",
        Action::Delete => "Delete",
        Action::List => "List",
        Action::Export => "Export",
        Action::Import => "Import",
    };
    format!("{verb} {resource}")
}

/// The default permission catalog.
pub fn default_permissions() -> Vec<Permission> {
    CATALOG
        .iter()
        .flat_map(|(resource, actions)| {
            actions
                .iter()
                .map(move |&action| {
                    Permission::new(*resource, action).with_description(describe(resource, action))
                })
        })
        .collect()
}

fn admin_grants(p: &Permission) -> bool {
    !matches!(p.resource.as_str(), "system" | "audit") || p.action == Action::Read
}

fn manager_grants(p: &Permission) -> bool {
    matches!(p.resource.as_str(), "users" | "partners" | "reports") && p.action != Action::Delete
}

fn user_grants(p: &Permission) -> bool {
    p.resource == "partners" && matches!(p.action, Action::Read | Action::List)
}

fn guest_grants(p: &Permission) -> bool {
    p.resource == "partners" && p.action == Action::Read
}

/// The five default roles, derived from `catalog`, from most to least privileged.
pub fn default_roles(catalog: &[Permission]) -> Vec<Role> {
    let select = |keep: fn(&Permission) -> bool| -> Vec<Permission> {
        catalog.iter().filter(|p| keep(p)).cloned().collect()
    };

    vec![
        Role::new(SUPER_ADMIN, "Full system access", catalog.to_vec())
            .with_options(RoleOptions::default().level(100)),
        Role::new(
            ADMIN,
            "Administrative access; read-only on system and audit",
            select(admin_grants),
        )
        .with_options(RoleOptions::default().level(80)),
        Role::new(
            MANAGER,
            "Manages users, partners and reports; cannot delete",
            select(manager_grants),
        )
        .with_options(RoleOptions::default().level(60)),
        Role::new(USER, "Reads and lists partners", select(user_grants))
            .with_options(RoleOptions::default().level(40)),
        Role::new(GUEST, "Reads partners", select(guest_grants))
            .with_options(RoleOptions::default().level(20)),
    ]
}
