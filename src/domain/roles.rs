//! Role classification
//!
//! Role rows in the store carry free-form names; gating logic only ever works
//! on the parsed [`RoleKind`], so role-name comparisons live in exactly one
//! place instead of being repeated per handler.

use serde::{Deserialize, Serialize};

/// The recognized permission classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Admin,
    Secretary,
    /// Directeur des études
    De,
    Teacher,
    Student,
}

impl RoleKind {
    /// Parse a stored role name, case-insensitively.
    ///
    /// `enseignant` is a legacy synonym for `teacher` kept for tokens issued
    /// before the naming migration; it is never emitted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "secretary" => Some(Self::Secretary),
            "de" => Some(Self::De),
            "teacher" | "enseignant" => Some(Self::Teacher),
            "student" => Some(Self::Student),
            _ => None,
        }
    }

    /// Canonical role name as stored and emitted
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Secretary => "secretary",
            Self::De => "de",
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }

    /// Administrative staff tier: full CRUD on institutional entities
    pub fn is_admin_family(&self) -> bool {
        matches!(self, Self::Admin | Self::Secretary | Self::De)
    }

    /// Teacher-level visibility; admin staff always retain it
    pub fn is_teacher_level(&self) -> bool {
        matches!(self, Self::Teacher) || self.is_admin_family()
    }
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(RoleKind::from_name("ADMIN"), Some(RoleKind::Admin));
        assert_eq!(RoleKind::from_name("Secretary"), Some(RoleKind::Secretary));
        assert_eq!(RoleKind::from_name("de"), Some(RoleKind::De));
    }

    #[test]
    fn test_legacy_teacher_synonym() {
        assert_eq!(RoleKind::from_name("enseignant"), Some(RoleKind::Teacher));
        assert_eq!(RoleKind::from_name("teacher"), Some(RoleKind::Teacher));
        // The canonical spelling is the only one emitted
        assert_eq!(RoleKind::Teacher.as_str(), "teacher");
    }

    #[test]
    fn test_unknown_names_do_not_parse() {
        assert_eq!(RoleKind::from_name("assistant"), None);
        assert_eq!(RoleKind::from_name(""), None);
    }

    #[test]
    fn test_admin_family_is_subset_of_teacher_level() {
        for kind in [
            RoleKind::Admin,
            RoleKind::Secretary,
            RoleKind::De,
            RoleKind::Teacher,
            RoleKind::Student,
        ] {
            if kind.is_admin_family() {
                assert!(kind.is_teacher_level());
            }
        }
        assert!(!RoleKind::Student.is_teacher_level());
        assert!(!RoleKind::Student.is_admin_family());
    }
}
