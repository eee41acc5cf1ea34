//! Input validation for CRUD payloads

use crate::utils::error::{ApiError, Result};
use std::sync::OnceLock;

static EMAIL_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn email_regex() -> &'static regex::Regex {
    EMAIL_REGEX.get_or_init(|| regex::Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"))
}

/// Validation helpers for request payloads
pub struct Validator;

impl Validator {
    /// Validate username (at least 3 visible characters)
    pub fn validate_username(username: &str) -> Result<()> {
        if username.trim().len() < 3 {
            return Err(ApiError::Validation(
                "Username must be at least 3 characters".to_string(),
            ));
        }
        if username.len() > 50 {
            return Err(ApiError::Validation(
                "Username cannot exceed 50 characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate email address format
    pub fn validate_email(email: &str) -> Result<()> {
        if !email_regex().is_match(email) {
            return Err(ApiError::Validation("Invalid email address".to_string()));
        }
        Ok(())
    }

    /// Validate password (at least 6 characters)
    pub fn validate_password(password: &str) -> Result<()> {
        if password.len() < 6 {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        if password.len() > 128 {
            return Err(ApiError::Validation(
                "Password cannot exceed 128 characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate a student matricule
    pub fn validate_matricule(matricule: &str) -> Result<()> {
        if matricule.trim().is_empty() {
            return Err(ApiError::Validation(
                "Matricule is required".to_string(),
            ));
        }
        if matricule.len() > 50 {
            return Err(ApiError::Validation(
                "Matricule cannot exceed 50 characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate an exam mark (0..=20), when present
    pub fn validate_mark(label: &str, value: Option<f32>) -> Result<()> {
        if let Some(v) = value {
            if !(0.0..=20.0).contains(&v) {
                return Err(ApiError::Validation(format!(
                    "{} must be between 0 and 20",
                    label
                )));
            }
        }
        Ok(())
    }

    /// Validate a semester number (1 or 2)
    pub fn validate_semester(semester: i32) -> Result<()> {
        if !(1..=2).contains(&semester) {
            return Err(ApiError::Validation(
                "Semester must be 1 or 2".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(Validator::validate_username("abc").is_ok());
        assert!(Validator::validate_username("ab").is_err());
        assert!(Validator::validate_username("  a ").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(Validator::validate_email("user@example.com").is_ok());
        assert!(Validator::validate_email("not-an-email").is_err());
        assert!(Validator::validate_email("a@b").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(Validator::validate_password("secret1").is_ok());
        assert!(Validator::validate_password("short").is_err());
    }

    #[test]
    fn test_validate_mark_bounds() {
        assert!(Validator::validate_mark("ce", Some(0.0)).is_ok());
        assert!(Validator::validate_mark("ce", Some(20.0)).is_ok());
        assert!(Validator::validate_mark("ce", Some(20.5)).is_err());
        assert!(Validator::validate_mark("ce", Some(-1.0)).is_err());
        assert!(Validator::validate_mark("ce", None).is_ok());
    }

    #[test]
    fn test_validate_semester() {
        assert!(Validator::validate_semester(1).is_ok());
        assert!(Validator::validate_semester(2).is_ok());
        assert!(Validator::validate_semester(3).is_err());
    }
}
