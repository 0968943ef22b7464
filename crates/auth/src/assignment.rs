use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{ActorId, Attributes};

/// Grant of one role to one actor.
///
/// `role_name` is a by-name reference. Deleting the role through the registry
/// cascades to its assignments; a restored snapshot may still carry dangling
/// names, which resolution skips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub user_id: ActorId,
    pub role_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<ActorId>,
    pub granted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Attributes>,
}

impl RoleAssignment {
    /// Active iff there is no expiry or the expiry is strictly after `at`.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > at)
    }
}

/// Optional grant details for `assign_role`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignOptions {
    pub granted_by: Option<ActorId>,
    pub expires_at: Option<DateTime<Utc>>,
    pub metadata: Option<Attributes>,
}

impl AssignOptions {
    pub fn granted_by(mut self, actor: impl Into<ActorId>) -> Self {
        self.granted_by = Some(actor.into());
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn metadata(mut self, metadata: Attributes) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
