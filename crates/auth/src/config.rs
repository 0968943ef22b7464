//! Startup configuration: environment flags and declarative policy documents.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_core::{ActorId, Attributes, RbacError};

use crate::{Permission, Role};

pub const ENV_BOOTSTRAP_DEFAULTS: &str = "WARDEN_BOOTSTRAP_DEFAULTS";
pub const ENV_POLICY_PATH: &str = "WARDEN_POLICY_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read policy file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid policy document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },

    #[error("policy rejected: {0}")]
    Policy(#[from] RbacError),
}

/// How a registry is assembled at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Install the default catalog and the five default roles first.
    pub bootstrap_defaults: bool,
    /// JSON [`PolicyDocument`] applied after the defaults.
    pub policy_path: Option<PathBuf>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            bootstrap_defaults: true,
            policy_path: None,
        }
    }
}

impl RegistryConfig {
    /// Reads `WARDEN_BOOTSTRAP_DEFAULTS` and `WARDEN_POLICY_PATH`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_BOOTSTRAP_DEFAULTS) {
            config.bootstrap_defaults = parse_flag(ENV_BOOTSTRAP_DEFAULTS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_POLICY_PATH).filter(|p| !p.trim().is_empty()) {
            config.policy_path = Some(PathBuf::from(raw.trim()));
        }

        Ok(config)
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
        }),
    }
}

/// Grant declared in a policy document. `grantedAt` is stamped on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyAssignment {
    pub user_id: ActorId,
    pub role_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<ActorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Attributes>,
}

/// Declarative policy: catalog entries, role definitions and grants.
///
/// Applied in that order, so assignments may reference roles defined in the
/// same document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub assignments: Vec<PolicyAssignment>,
}

impl PolicyDocument {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }
}
