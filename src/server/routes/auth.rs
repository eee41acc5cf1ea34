//! Authentication endpoints: register, login, profile

use crate::auth::identity::{AuthSession, Identity};
use crate::auth::password::{hash_password, verify_password};
use crate::domain::{LinkOutcome, RoleKind};
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::database::entities::{role, student, teacher, user};
use crate::storage::database::NewUser;
use crate::storage::Database;
use crate::utils::error::{ApiError, Result};
use crate::utils::validation::Validator;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/profile", web::get().to(profile));
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    /// Matricule of an existing student profile to attach, when known
    pub matricule: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: user::Model,
    /// Outcome of the post-registration student link step
    pub student_link: LinkOutcome,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub username_or_email: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: LoginUserInfo,
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserInfo {
    pub id: uuid::Uuid,
    pub username: String,
    pub email: String,
    pub role: Option<role::Model>,
    pub status: String,
    pub last_login_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: user::Model,
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<student::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<teacher::Model>,
}

/// Public registration; new accounts default to the student role
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    info!("Registration attempt: {}", request.username);

    let username = request.username.trim().to_string();
    let email = request.email.trim().to_lowercase();

    Validator::validate_username(&username)?;
    Validator::validate_email(&email)?;
    Validator::validate_password(&request.password)?;

    let db = &state.storage.database;

    // Best-effort pre-checks; the unique columns remain the final arbiter
    if db.find_user_by_username(&username).await?.is_some()
        || db.find_user_by_email(&email).await?.is_some()
    {
        return Err(ApiError::conflict("Username or email already in use"));
    }

    let default_role = db.find_role_by_name(RoleKind::Student.as_str()).await?;
    let password_hash = hash_password(&request.password)?;

    let created = db
        .create_user(NewUser {
            username,
            email,
            password_hash,
            phone: request.phone,
            photo_url: request.photo_url,
            status: "active".to_string(),
            role_id: default_role.map(|r| r.id),
        })
        .await?;

    // Separate, explicitly-reported step: its failure never undoes the
    // registration above.
    let student_link = link_student_profile(db, &created, request.matricule.as_deref()).await;

    info!("User registered: {}", created.username);
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        RegisterResponse {
            user: created,
            student_link,
        },
        "Account created",
    )))
}

/// Try to attach an existing unlinked student profile by matricule
async fn link_student_profile(
    db: &Database,
    user: &user::Model,
    matricule: Option<&str>,
) -> LinkOutcome {
    let Some(matricule) = matricule.filter(|m| !m.trim().is_empty()) else {
        return LinkOutcome::NotAttempted;
    };

    match db.find_student_by_matricule(matricule.trim()).await {
        Ok(Some(student)) if student.user_id.is_none() => {
            match db.link_student_to_user(student.id, user.id).await {
                Ok(linked) => LinkOutcome::Linked {
                    student_id: linked.id,
                },
                Err(e) => {
                    warn!("Post-registration link failed for {}: {}", user.username, e);
                    LinkOutcome::AlreadyLinked
                }
            }
        }
        Ok(Some(_)) => LinkOutcome::AlreadyLinked,
        Ok(None) => LinkOutcome::NoMatch,
        Err(e) => {
            warn!("Post-registration lookup failed for {}: {}", user.username, e);
            LinkOutcome::NoMatch
        }
    }
}

/// Login with username or email; issues the session token
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    let identifier = request
        .username
        .or(request.email)
        .or(request.username_or_email)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation("Username or email is required"))?;

    if request.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let db = &state.storage.database;

    // Unknown account and wrong password are indistinguishable to the caller
    let (user, role) = db
        .find_user_for_login(&identifier)
        .await?
        .ok_or_else(|| ApiError::auth("Invalid credentials"))?;

    if !user.is_active() {
        warn!("Login attempt for inactive account: {}", user.username);
        return Err(ApiError::AccountInactive(
            "Account is inactive; wait for an administrator to validate it".to_string(),
        ));
    }

    if !verify_password(&request.password, &user.password_hash)? {
        warn!("Invalid password for user: {}", user.username);
        return Err(ApiError::auth("Invalid credentials"));
    }

    let token = state
        .auth
        .jwt()
        .issue(user.id, role.as_ref().map(|r| r.name.as_str()))?;

    if let Err(e) = db.update_user_last_login(user.id).await {
        warn!("Failed to record last login for {}: {}", user.username, e);
    }

    info!("User logged in: {}", user.username);
    Ok(HttpResponse::Ok().json(ApiResponse::success(LoginResponse {
        user: LoginUserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
            role,
            status: user.status,
            last_login_at: user.last_login_at,
        },
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.jwt().lifetime(),
    })))
}

/// Profile of the authenticated caller, with the linked profile when any
pub async fn profile(session: AuthSession) -> Result<HttpResponse> {
    let (student, teacher) = match &session.identity {
        Identity::Student(profile) => (Some(profile.clone()), None),
        Identity::Teacher(profile) => (None, Some(profile.clone())),
        _ => (None, None),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(ProfileResponse {
        role: session.role.map(|r| r.as_str().to_string()),
        user: session.user,
        student,
        teacher,
    })))
}
