use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use stratum_core::{AppError, AppResult, parse_uuid};
use uuid::Uuid;

use crate::SystemRole;

/// Minimum role key length in characters.
pub const ROLE_KEY_MIN_LENGTH: usize = 2;
/// Maximum role key length in characters.
pub const ROLE_KEY_MAX_LENGTH: usize = 50;
/// Minimum role label length in characters.
pub const ROLE_LABEL_MIN_LENGTH: usize = 2;
/// Maximum role label length in characters.
pub const ROLE_LABEL_MAX_LENGTH: usize = 100;
/// Maximum role description length in characters.
pub const ROLE_DESCRIPTION_MAX_LENGTH: usize = 500;

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a role identifier from its transport form.
    pub fn parse(value: &str) -> AppResult<Self> {
        parse_uuid("role_id", value).map(Self)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated role key slug.
///
/// Lowercase ASCII letters and underscores only, 2 to 50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleKey(String);

impl RoleKey {
    /// Creates a validated role key.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let length = value.chars().count();

        if !(ROLE_KEY_MIN_LENGTH..=ROLE_KEY_MAX_LENGTH).contains(&length) {
            return Err(AppError::Validation(format!(
                "role key must be between {ROLE_KEY_MIN_LENGTH} and {ROLE_KEY_MAX_LENGTH} characters, got {length}"
            )));
        }

        if !value
            .chars()
            .all(|character| character.is_ascii_lowercase() || character == '_')
        {
            return Err(AppError::Validation(format!(
                "role key '{value}' must match ^[a-z_]+$"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether the key belongs to a system-reserved role.
    #[must_use]
    pub fn is_system_reserved(&self) -> bool {
        SystemRole::is_reserved_key(self.as_str())
    }
}

impl Display for RoleKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Validated human-readable role label, 2 to 100 characters after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleLabel(String);

impl RoleLabel {
    /// Creates a validated role label.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into().trim().to_owned();
        let length = value.chars().count();

        if !(ROLE_LABEL_MIN_LENGTH..=ROLE_LABEL_MAX_LENGTH).contains(&length) {
            return Err(AppError::Validation(format!(
                "role label must be between {ROLE_LABEL_MIN_LENGTH} and {ROLE_LABEL_MAX_LENGTH} characters, got {length}"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the underlying label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RoleLabel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Normalizes an optional description: blank becomes `None`, long is rejected.
pub fn normalize_role_description(value: Option<String>) -> AppResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let length = trimmed.chars().count();
    if length > ROLE_DESCRIPTION_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "role description must be at most {ROLE_DESCRIPTION_MAX_LENGTH} characters, got {length}"
        )));
    }

    Ok(Some(trimmed.to_owned()))
}

/// Role definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    key: RoleKey,
    label: RoleLabel,
    description: Option<String>,
}

impl Role {
    /// Creates a role from validated parts.
    #[must_use]
    pub fn new(id: RoleId, key: RoleKey, label: RoleLabel, description: Option<String>) -> Self {
        Self {
            id,
            key,
            label,
            description,
        }
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the immutable role key.
    #[must_use]
    pub fn key(&self) -> &RoleKey {
        &self.key
    }

    /// Returns the role label.
    #[must_use]
    pub fn label(&self) -> &RoleLabel {
        &self.label
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the role can never be deleted.
    #[must_use]
    pub fn is_system_reserved(&self) -> bool {
        self.key.is_system_reserved()
    }

    /// Returns a copy with label and description changed; the key never changes.
    #[must_use]
    pub fn with_updates(
        &self,
        label: Option<RoleLabel>,
        description: Option<Option<String>>,
    ) -> Self {
        Self {
            id: self.id,
            key: self.key.clone(),
            label: label.unwrap_or_else(|| self.label.clone()),
            description: description.unwrap_or_else(|| self.description.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{RoleId, RoleKey, RoleLabel, normalize_role_description};

    #[test]
    fn role_key_rejects_uppercase_and_digits() {
        assert!(RoleKey::new("Editor").is_err());
        assert!(RoleKey::new("editor2").is_err());
        assert!(RoleKey::new("edi-tor").is_err());
    }

    #[test]
    fn role_key_enforces_length_bounds() {
        assert!(RoleKey::new("a").is_err());
        assert!(RoleKey::new("ab").is_ok());
        assert!(RoleKey::new("a".repeat(50)).is_ok());
        assert!(RoleKey::new("a".repeat(51)).is_err());
    }

    #[test]
    fn role_key_detects_reserved_keys() {
        let Ok(key) = RoleKey::new("master_admin") else {
            panic!("master_admin should be a valid key");
        };
        assert!(key.is_system_reserved());
    }

    #[test]
    fn role_label_is_trimmed_before_length_check() {
        assert!(RoleLabel::new("  E  ").is_err());
        let label = RoleLabel::new("  Editor ").map(|label| label.as_str().to_owned());
        assert_eq!(label.ok().as_deref(), Some("Editor"));
    }

    #[test]
    fn blank_description_normalizes_to_none() {
        assert_eq!(
            normalize_role_description(Some("   ".to_owned())).ok(),
            Some(None)
        );
        assert!(normalize_role_description(Some("x".repeat(501))).is_err());
    }

    #[test]
    fn role_id_parse_rejects_non_uuid() {
        assert!(RoleId::parse("role-1").is_err());
    }

    proptest! {
        #[test]
        fn valid_slugs_are_accepted(value in "[a-z_]{2,50}") {
            prop_assert!(RoleKey::new(value).is_ok());
        }

        #[test]
        fn keys_with_foreign_characters_are_rejected(
            prefix in "[a-z_]{1,20}",
            foreign in "[A-Z0-9 .-]",
            suffix in "[a-z_]{0,20}",
        ) {
            let value = format!("{prefix}{foreign}{suffix}");
            prop_assert!(RoleKey::new(value).is_err());
        }
    }
}
