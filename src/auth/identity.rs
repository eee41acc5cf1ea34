//! Request-scoped identity resolution
//!
//! [`AuthSession`] is the single source of caller identity: it extracts the
//! bearer token, verifies it, reloads the user row (the store is
//! authoritative, not the token claim) and attaches the linked student or
//! teacher profile. Downstream code never re-derives any of this.

use crate::domain::RoleKind;
use crate::server::state::AppState;
use crate::storage::database::entities::{student, teacher, user};
use crate::storage::Database;
use crate::utils::error::{ApiError, Result};
use actix_web::http::header::HeaderMap;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::Future;
use std::pin::Pin;
use tracing::debug;
use uuid::Uuid;

/// Role-scoped identity of the caller
///
/// A student or teacher role with no linked profile row is a valid but
/// degraded identity; handlers that need the profile ask for it explicitly
/// and get a "profile not linked" error instead of a crash.
#[derive(Debug, Clone)]
pub enum Identity {
    Admin,
    /// Secretary or directeur des études
    Staff(RoleKind),
    Teacher(teacher::Model),
    UnlinkedTeacher,
    Student(student::Model),
    UnlinkedStudent,
    /// Role missing or outside the recognized set; matches no gate
    Unrecognized,
}

/// Fully-resolved caller context, built once per request
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated user row
    pub user: user::Model,
    /// Parsed role, when recognized
    pub role: Option<RoleKind>,
    /// Role-scoped identity with the attached profile
    pub identity: Identity,
}

impl AuthSession {
    /// Resolve a verified token subject into a full session.
    ///
    /// A missing user row (deleted since issuance) resolves to the same
    /// failure as an invalid token; a stale credential must not leak whether
    /// the account ever existed.
    pub async fn resolve(db: &Database, user_id: Uuid) -> Result<Self> {
        let (user, role_row) = db
            .find_user_with_role(user_id)
            .await?
            .ok_or(ApiError::UnknownUser)?;

        let role = role_row.as_ref().and_then(|r| RoleKind::from_name(&r.name));

        let identity = match role {
            Some(RoleKind::Admin) => Identity::Admin,
            Some(kind @ (RoleKind::Secretary | RoleKind::De)) => Identity::Staff(kind),
            Some(RoleKind::Teacher) => match db.find_teacher_by_user_id(user.id).await? {
                Some(profile) => Identity::Teacher(profile),
                None => Identity::UnlinkedTeacher,
            },
            Some(RoleKind::Student) => match db.find_student_by_user_id(user.id).await? {
                Some(profile) => Identity::Student(profile),
                None => Identity::UnlinkedStudent,
            },
            None => Identity::Unrecognized,
        };

        debug!(user = %user.username, role = ?role, "Resolved request identity");
        Ok(Self {
            user,
            role,
            identity,
        })
    }

    /// Linked student profile id, never guessed
    pub fn student_id(&self) -> Option<Uuid> {
        match &self.identity {
            Identity::Student(profile) => Some(profile.id),
            _ => None,
        }
    }

    /// Linked teacher profile id, never guessed
    pub fn teacher_id(&self) -> Option<Uuid> {
        match &self.identity {
            Identity::Teacher(profile) => Some(profile.id),
            _ => None,
        }
    }

    /// Linked student profile, or the explicit "account setup incomplete"
    /// error when the student role has no profile row yet
    pub fn require_student_profile(&self) -> Result<&student::Model> {
        match &self.identity {
            Identity::Student(profile) => Ok(profile),
            Identity::UnlinkedStudent => Err(ApiError::profile_not_linked(
                "No student profile is linked to this account yet",
            )),
            _ => Err(ApiError::forbidden("Reserved for students")),
        }
    }

    /// Linked teacher profile, with the same degraded-identity contract
    pub fn require_teacher_profile(&self) -> Result<&teacher::Model> {
        match &self.identity {
            Identity::Teacher(profile) => Ok(profile),
            Identity::UnlinkedTeacher => Err(ApiError::profile_not_linked(
                "No teacher profile is linked to this account yet",
            )),
            _ => Err(ApiError::forbidden("Reserved for teachers")),
        }
    }
}

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<String> {
    let header = headers
        .get("authorization")
        .ok_or(ApiError::MissingToken)?
        .to_str()
        .map_err(|_| ApiError::MissingToken)?;

    header
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or(ApiError::MissingToken)
}

impl FromRequest for AuthSession {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| ApiError::internal("Application state missing"))?;

            let token = bearer_token(req.headers())?;
            let claims = state.auth.jwt().verify(&token)?;
            AuthSession::resolve(&state.storage.database, claims.sub).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_is_missing_token() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::MissingToken)
        ));
    }

    #[test]
    fn test_wrong_scheme_is_missing_token() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::MissingToken)
        ));
    }
}
