//! `warden-auth`: in-memory role-based authorization engine.
//!
//! This crate is intentionally decoupled from HTTP, authentication and
//! storage. Callers hand it an already-authenticated [`ActorId`] and get back
//! a boolean decision.
//!
//! ```
//! use warden_auth::{Action, ActorId, AssignOptions, AuthorizationRegistry, Permission, RoleOptions};
//!
//! let registry = AuthorizationRegistry::new();
//! registry.create_role(
//!     "editor",
//!     "Edits documents",
//!     vec![Permission::new("docs", Action::Update)],
//!     RoleOptions::default(),
//! );
//! registry.assign_role(42u64, "editor", AssignOptions::default()).unwrap();
//!
//! let actor = ActorId::from(42u64);
//! assert!(registry.has_permission(&actor, "docs", Action::Update, None));
//! assert!(!registry.has_permission(&actor, "docs", Action::Delete, None));
//! ```

pub mod assignment;
pub mod assignment_store;
pub mod authorize;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod permissions;
pub mod registry;
pub mod report;
pub mod role_store;
pub mod roles;

mod ordered;

pub use assignment::{AssignOptions, RoleAssignment};
pub use assignment_store::AssignmentStore;
pub use authorize::{evaluate_conditions, AuthorizationExplanation, DenialKind, Grant, GrantPath};
pub use catalog::PermissionCatalog;
pub use config::{ConfigError, PolicyAssignment, PolicyDocument, RegistryConfig};
pub use permissions::{Action, ParseActionError, Permission, PermissionKey};
pub use registry::{AuthorizationRegistry, RoleDeletion};
pub use report::{RegistrySnapshot, RegistryStats};
pub use role_store::RoleStore;
pub use roles::{Role, RoleMetadata, RoleOptions, RoleUpdate, SUPER_ADMIN};

pub use warden_core::{ActorId, AttributeValue, Attributes, Clock, ManualClock, RbacError, RbacResult, SystemClock};
