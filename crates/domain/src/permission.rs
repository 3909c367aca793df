use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use stratum_core::{AppResult, NonEmptyString, parse_uuid};
use uuid::Uuid;

/// Unique identifier for a permission reference row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Creates a new random permission identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a permission identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a permission identifier from its transport form.
    pub fn parse(value: &str) -> AppResult<Self> {
        parse_uuid("permission_id", value).map(Self)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Atomic capability identifier. Reference data created out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    key: NonEmptyString,
    description: Option<String>,
}

impl Permission {
    /// Creates a permission with a validated key.
    pub fn new(
        id: PermissionId,
        key: impl Into<String>,
        description: Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            key: NonEmptyString::new(key)?,
            description,
        })
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the capability key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Legacy per-module grant row, unique on `(role, module, action)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePermission {
    module: NonEmptyString,
    action: NonEmptyString,
    allowed: bool,
}

impl ModulePermission {
    /// Creates a module permission with trimmed, lowercase module and action names.
    pub fn new(module: &str, action: &str, allowed: bool) -> AppResult<Self> {
        Ok(Self {
            module: NonEmptyString::new(module.trim().to_lowercase())?,
            action: NonEmptyString::new(action.trim().to_lowercase())?,
            allowed,
        })
    }

    /// Returns the module name.
    #[must_use]
    pub fn module(&self) -> &str {
        self.module.as_str()
    }

    /// Returns the action name.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Returns whether the action is allowed.
    #[must_use]
    pub fn allowed(&self) -> bool {
        self.allowed
    }
}
