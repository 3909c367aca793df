use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stratum_core::AppError;

/// Sortable columns of the role list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSortField {
    /// Sort by role key.
    #[default]
    Key,
    /// Sort by role label.
    Label,
    /// Sort by number of bound permissions.
    PermissionCount,
}

impl RoleSortField {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Label => "label",
            Self::PermissionCount => "permission_count",
        }
    }
}

impl FromStr for RoleSortField {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "key" => Ok(Self::Key),
            "label" => Ok(Self::Label),
            "permission_count" => Ok(Self::PermissionCount),
            _ => Err(AppError::Validation(format!(
                "unknown role sort field '{value}'"
            ))),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(AppError::Validation(format!("unknown sort order '{value}'"))),
        }
    }
}

/// Query parameters for the role list view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleListQuery {
    /// Case-insensitive substring matched against key or label.
    pub search: Option<String>,
    /// Sort column.
    pub sort_by: RoleSortField,
    /// Sort direction.
    pub sort_order: SortOrder,
}

impl RoleListQuery {
    /// Returns the trimmed, lowercased search term, if any.
    #[must_use]
    pub fn normalized_search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{RoleListQuery, RoleSortField, SortOrder};

    #[test]
    fn defaults_sort_by_key_ascending() {
        let query = RoleListQuery::default();
        assert_eq!(query.sort_by, RoleSortField::Key);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn sort_order_parsing_is_case_insensitive() {
        assert_eq!(SortOrder::from_str("DESC").ok(), Some(SortOrder::Desc));
        assert!(RoleSortField::from_str("created").is_err());
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = RoleListQuery {
            search: Some("  ".to_owned()),
            ..RoleListQuery::default()
        };
        assert_eq!(query.normalized_search(), None);
    }
}
