use serde::{Deserialize, Serialize};

use warden_core::{Attributes, Entity};

use crate::Permission;

/// Name of the role that can never be deleted.
pub const SUPER_ADMIN: &str = "super_admin";

/// Reporting metadata attached to a role.
///
/// `level` is used only for statistics; it never influences decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMetadata {
    pub level: u32,
    #[serde(flatten)]
    pub extra: Attributes,
}

impl RoleMetadata {
    pub fn level(level: u32) -> Self {
        Self {
            level,
            extra: Attributes::new(),
        }
    }
}

/// A named bundle of permissions.
///
/// `inherits` holds role *names*. They are looked up when a decision is made,
/// so an inherited role may be redefined or deleted independently of this one.
/// Inheritance is followed one level only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub permissions: Vec<Permission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RoleMetadata>,
}

impl Role {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: Vec<Permission>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            permissions,
            inherits: None,
            metadata: None,
        }
    }

    pub fn with_options(mut self, options: RoleOptions) -> Self {
        self.inherits = options.inherits;
        self.metadata = options.metadata;
        self
    }

    pub fn is_protected(&self) -> bool {
        self.name == SUPER_ADMIN
    }

    pub fn inherited_names(&self) -> impl Iterator<Item = &str> {
        self.inherits.iter().flatten().map(String::as_str)
    }

    /// Level used for reporting; roles without metadata report level 0.
    pub fn level(&self) -> u32 {
        self.metadata.as_ref().map_or(0, |m| m.level)
    }

    /// Applies a partial update. Only fields present in `update` change.
    pub fn merge(&mut self, update: RoleUpdate) {
        let RoleUpdate {
            description,
            permissions,
            inherits,
            metadata,
        } = update;

        if let Some(description) = description {
            self.description = description;
        }
        if let Some(permissions) = permissions {
            self.permissions = permissions;
        }
        if let Some(inherits) = inherits {
            self.inherits = Some(inherits);
        }
        if let Some(metadata) = metadata {
            self.metadata = Some(metadata);
        }
    }
}

impl Entity for Role {
    type Id = str;

    fn id(&self) -> &str {
        &self.name
    }
}

/// Optional parts of a role supplied to `create_role`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleOptions {
    pub inherits: Option<Vec<String>>,
    pub metadata: Option<RoleMetadata>,
}

impl RoleOptions {
    pub fn inherits<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inherits = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn level(mut self, level: u32) -> Self {
        self.metadata = Some(RoleMetadata::level(level));
        self
    }

    pub fn metadata(mut self, metadata: RoleMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Shallow partial update for an existing role. The name is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RoleMetadata>,
}
