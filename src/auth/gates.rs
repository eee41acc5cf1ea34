//! Role gates
//!
//! Reusable pre-conditions over a resolved [`AuthSession`]. Each gate either
//! passes or stops the request with a forbidden error carrying a
//! gate-specific message; a missing or unrecognized role matches no gate.

use crate::auth::identity::AuthSession;
use crate::domain::RoleKind;
use crate::utils::error::{ApiError, Result};

impl AuthSession {
    /// Admin only
    pub fn require_admin(&self) -> Result<()> {
        match self.role {
            Some(RoleKind::Admin) => Ok(()),
            _ => Err(ApiError::forbidden("Reserved for the administrator")),
        }
    }

    /// Administrative staff tier: admin, secretary, DE
    pub fn require_admin_family(&self) -> Result<()> {
        match self.role {
            Some(kind) if kind.is_admin_family() => Ok(()),
            _ => Err(ApiError::forbidden(
                "Reserved for administration (admin, secretary, DE)",
            )),
        }
    }

    /// Teachers, plus the admin family for oversight
    pub fn require_teacher(&self) -> Result<()> {
        match self.role {
            Some(kind) if kind.is_teacher_level() => Ok(()),
            _ => Err(ApiError::forbidden("Reserved for teachers")),
        }
    }

    /// Students only; no admin fallback
    pub fn require_student(&self) -> Result<()> {
        match self.role {
            Some(RoleKind::Student) => Ok(()),
            _ => Err(ApiError::forbidden("Reserved for students")),
        }
    }

    /// Student gate plus the profile requirement, in one step
    pub fn require_linked_student(&self) -> Result<uuid::Uuid> {
        self.require_student()?;
        Ok(self.require_student_profile()?.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::Identity;
    use crate::storage::database::entities::user;
    use chrono::Utc;
    use uuid::Uuid;

    fn session_with(role: Option<RoleKind>, identity: Identity) -> AuthSession {
        AuthSession {
            user: user::Model {
                id: Uuid::new_v4(),
                username: "tester".to_string(),
                email: "tester@example.com".to_string(),
                password_hash: "$argon2id$fake".to_string(),
                phone: None,
                photo_url: None,
                status: "active".to_string(),
                role_id: Some(1),
                last_login_at: None,
                deleted_at: None,
                created_at: Utc::now().into(),
                updated_at: Utc::now().into(),
            },
            role,
            identity,
        }
    }

    #[test]
    fn test_admin_family_passes_all_staff_gates() {
        for kind in [RoleKind::Admin, RoleKind::Secretary, RoleKind::De] {
            let identity = match kind {
                RoleKind::Admin => Identity::Admin,
                other => Identity::Staff(other),
            };
            let session = session_with(Some(kind), identity);
            assert!(session.require_admin_family().is_ok());
            // Every admin-family role satisfies the teacher gate
            assert!(session.require_teacher().is_ok());
        }
    }

    #[test]
    fn test_only_admin_passes_admin_gate() {
        let admin = session_with(Some(RoleKind::Admin), Identity::Admin);
        assert!(admin.require_admin().is_ok());

        let secretary = session_with(
            Some(RoleKind::Secretary),
            Identity::Staff(RoleKind::Secretary),
        );
        assert!(secretary.require_admin().is_err());
    }

    #[test]
    fn test_student_gate_excludes_admin() {
        let admin = session_with(Some(RoleKind::Admin), Identity::Admin);
        assert!(matches!(
            admin.require_student(),
            Err(ApiError::ForbiddenRole(_))
        ));

        let student = session_with(Some(RoleKind::Student), Identity::UnlinkedStudent);
        assert!(student.require_student().is_ok());
    }

    #[test]
    fn test_student_does_not_pass_teacher_gate() {
        let student = session_with(Some(RoleKind::Student), Identity::UnlinkedStudent);
        assert!(student.require_teacher().is_err());
        assert!(student.require_admin_family().is_err());
    }

    #[test]
    fn test_missing_role_matches_no_gate() {
        let session = session_with(None, Identity::Unrecognized);
        assert!(session.require_admin().is_err());
        assert!(session.require_admin_family().is_err());
        assert!(session.require_teacher().is_err());
        assert!(session.require_student().is_err());
    }

    #[test]
    fn test_unlinked_student_is_valid_but_degraded() {
        let session = session_with(Some(RoleKind::Student), Identity::UnlinkedStudent);
        // The gate itself passes; demanding the profile yields the explicit
        // "not linked" condition rather than a crash or a 403.
        assert!(session.require_student().is_ok());
        assert!(matches!(
            session.require_linked_student(),
            Err(ApiError::ProfileNotLinked(_))
        ));
        assert_eq!(session.student_id(), None);
    }

    #[test]
    fn test_unlinked_teacher_profile_demand() {
        let session = session_with(Some(RoleKind::Teacher), Identity::UnlinkedTeacher);
        assert!(session.require_teacher().is_ok());
        assert!(matches!(
            session.require_teacher_profile(),
            Err(ApiError::ProfileNotLinked(_))
        ));
        assert_eq!(session.teacher_id(), None);
    }
}
