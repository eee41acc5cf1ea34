//! User account management
//!
//! Listing, CRUD, approval, role changes, soft deletion and profile linking.
//! Everything here is admin-family territory except the shared teacher
//! listing and the role-dependent `/modules` view.

use crate::auth::identity::{AuthSession, Identity};
use crate::auth::password::hash_password;
use crate::domain::RoleKind;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::database::entities::{module, note, promotion, role, teacher, user};
use crate::storage::database::NewUser;
use crate::storage::Database;
use crate::utils::error::{ApiError, Result};
use crate::utils::validation::Validator;
use actix_web::{web, HttpResponse};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_users))
        .route("", web::post().to(create_user))
        .route("/teachers", web::get().to(list_teacher_users))
        .route("/modules", web::get().to(my_modules))
        .route("/roles", web::get().to(list_roles))
        .route("/non-students", web::get().to(list_non_students))
        .route("/students", web::get().to(list_student_users))
        .route("/{id}", web::get().to(get_user))
        .route("/{id}", web::put().to(update_user))
        .route("/{id}", web::delete().to(delete_user))
        .route("/{id}/role", web::put().to(update_user_role))
        .route("/{id}/approve", web::patch().to(approve_user))
        .route("/{id}/restore", web::patch().to(restore_user))
        .route("/{id}/force", web::delete().to(force_delete_user))
        .route("/{id}/password", web::put().to(update_user_password))
        .route(
            "/{user_id}/link-student/{student_id}",
            web::put().to(link_student),
        );
}

/// User row with its role joined in
#[derive(Debug, Serialize)]
pub struct UserWithRole {
    #[serde(flatten)]
    pub user: user::Model,
    pub role: Option<role::Model>,
}

impl From<(user::Model, Option<role::Model>)> for UserWithRole {
    fn from((user, role): (user::Model, Option<role::Model>)) -> Self {
        Self { user, role }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub role_id: i32,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub status: Option<String>,
    pub role_id: Option<i32>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

async fn list_users(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let users = state.storage.database.list_users().await?;
    let data: Vec<UserWithRole> = users.into_iter().map(UserWithRole::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

async fn list_teacher_users(
    state: web::Data<AppState>,
    session: AuthSession,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let users = state
        .storage
        .database
        .list_users_by_role_name(RoleKind::Teacher.as_str(), false)
        .await?;
    let data: Vec<UserWithRole> = users.into_iter().map(UserWithRole::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

async fn list_non_students(
    state: web::Data<AppState>,
    session: AuthSession,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let users = state
        .storage
        .database
        .list_users_by_role_name(RoleKind::Student.as_str(), true)
        .await?;
    let data: Vec<UserWithRole> = users.into_iter().map(UserWithRole::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

async fn list_student_users(
    state: web::Data<AppState>,
    session: AuthSession,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let users = state
        .storage
        .database
        .list_users_by_role_name(RoleKind::Student.as_str(), false)
        .await?;
    let data: Vec<UserWithRole> = users.into_iter().map(UserWithRole::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

async fn list_roles(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let roles = state.storage.database.list_roles().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(roles)))
}

/// Module row with its teacher and promotion, for staff/teacher views
#[derive(Debug, Serialize)]
pub struct ModuleView {
    #[serde(flatten)]
    pub module: module::Model,
    pub teacher: Option<teacher::Model>,
    pub promotion: Option<promotion::Model>,
}

/// Module row with the student's own notes attached
#[derive(Debug, Serialize)]
pub struct StudentModuleView {
    #[serde(flatten)]
    pub module: module::Model,
    pub teacher: Option<teacher::Model>,
    pub notes: Vec<note::Model>,
}

/// Role-dependent module view: staff see everything, teachers their own
/// modules, students their promotion's modules with their own notes
async fn my_modules(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    let db = &state.storage.database;

    match &session.identity {
        Identity::Admin | Identity::Staff(_) => {
            let modules = db.list_modules().await?;
            let data: Vec<ModuleView> = modules
                .into_iter()
                .map(|(m, t, p, _)| ModuleView {
                    module: m,
                    teacher: t,
                    promotion: p,
                })
                .collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
        }
        Identity::Teacher(_) | Identity::UnlinkedTeacher => {
            let profile = session.require_teacher_profile()?;
            let modules = db.list_modules_by_teacher(profile.id).await?;
            let data: Vec<ModuleView> = modules
                .into_iter()
                .map(|(m, t, p, _)| ModuleView {
                    module: m,
                    teacher: t,
                    promotion: p,
                })
                .collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
        }
        Identity::Student(_) | Identity::UnlinkedStudent => {
            let profile = session.require_student_profile()?;
            let modules = db.list_modules_by_promotion(profile.promotion_id).await?;
            let mut data = Vec::with_capacity(modules.len());
            for (m, t, _, _) in modules {
                let notes = db
                    .list_notes_by_module(m.id)
                    .await?
                    .into_iter()
                    .filter(|(n, _, _)| n.student_id == profile.id)
                    .map(|(n, _, _)| n)
                    .collect();
                data.push(StudentModuleView {
                    module: m,
                    teacher: t,
                    notes,
                });
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
        }
        Identity::Unrecognized => Err(ApiError::forbidden("Reserved for recognized roles")),
    }
}

async fn get_user(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let found = state
        .storage
        .database
        .find_user_with_role(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserWithRole::from(found))))
}

async fn create_user(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();

    let username = request.username.trim().to_string();
    let email = request.email.trim().to_lowercase();
    Validator::validate_username(&username)?;
    Validator::validate_email(&email)?;
    Validator::validate_password(&request.password)?;

    let db = &state.storage.database;
    db.find_role(request.role_id)
        .await?
        .ok_or_else(|| ApiError::validation("Unknown roleId"))?;

    if db.find_user_by_username(&username).await?.is_some()
        || db.find_user_by_email(&email).await?.is_some()
    {
        return Err(ApiError::conflict("User already exists"));
    }

    let password_hash = hash_password(&request.password)?;
    let created = db
        .create_user(NewUser {
            username,
            email,
            password_hash,
            phone: request.phone,
            photo_url: request.photo_url,
            status: request.status.unwrap_or_else(|| "inactive".to_string()),
            role_id: Some(request.role_id),
        })
        .await?;

    let with_role = db
        .find_user_with_role(created.id)
        .await?
        .ok_or_else(|| ApiError::internal("Created user vanished"))?;
    Ok(HttpResponse::Created().json(ApiResponse::success(UserWithRole::from(with_role))))
}

async fn update_user(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();
    let db = &state.storage.database;

    if let Some(username) = &request.username {
        Validator::validate_username(username)?;
    }
    if let Some(email) = &request.email {
        Validator::validate_email(email)?;
    }
    let password_hash = match &request.password {
        Some(password) => {
            Validator::validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let updated = db
        .update_user(
            path.into_inner(),
            request.username,
            request.email.map(|e| e.to_lowercase()),
            request.phone.map(Some),
            request.photo_url.map(Some),
            request.status,
            request.role_id.map(Some),
            password_hash,
        )
        .await?;

    let with_role = db
        .find_user_with_role(updated.id)
        .await?
        .ok_or_else(|| ApiError::internal("Updated user vanished"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        UserWithRole::from(with_role),
        "User updated",
    )))
}

/// Change a user's role, creating the matching profile row when the new
/// role demands one
async fn update_user_role(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let user_id = path.into_inner();
    let db = &state.storage.database;

    let role = db
        .find_role(request.role_id)
        .await?
        .ok_or_else(|| ApiError::validation("Unknown roleId"))?;

    let updated = db
        .update_user(user_id, None, None, None, None, None, Some(Some(role.id)), None)
        .await?;

    match RoleKind::from_name(&role.name) {
        Some(RoleKind::Student) => {
            ensure_student_profile(db, &updated).await?;
        }
        Some(RoleKind::Teacher) => {
            if db.find_teacher_by_user_id(updated.id).await?.is_none() {
                db.create_teacher(updated.username.clone(), None, None, None, Some(updated.id))
                    .await?;
            }
        }
        _ => {}
    }

    info!("Role of {} changed to {}", updated.username, role.name);
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(updated, "Role updated")))
}

/// Activate an account; students get a profile created on the spot when
/// they have none
async fn approve_user(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let user_id = path.into_inner();
    let db = &state.storage.database;

    let (user, role) = db
        .find_user_with_role(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let is_student = role
        .as_ref()
        .and_then(|r| RoleKind::from_name(&r.name))
        .map(|k| k == RoleKind::Student)
        .unwrap_or(false);

    if is_student {
        ensure_student_profile(db, &user).await?;
    }

    let activated = db.set_user_status(user.id, "active").await?;
    info!("User approved: {}", activated.username);
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        activated,
        if is_student {
            "Student validated: account activated and profile ensured"
        } else {
            "User validated"
        },
    )))
}

/// Create a minimal student profile for a user lacking one. Requires at
/// least one promotion to exist to satisfy the foreign key.
async fn ensure_student_profile(db: &Database, user: &user::Model) -> Result<()> {
    if db.find_student_by_user_id(user.id).await?.is_some() {
        return Ok(());
    }

    let promotion = db
        .first_promotion()
        .await?
        .ok_or_else(|| ApiError::validation("No promotion exists to place the student in"))?;

    let matricule = format!("ETU-{:05}", rand::thread_rng().gen_range(0..100_000));
    db.create_student(
        matricule,
        user.username.clone(),
        None,
        None,
        None,
        None,
        None,
        None,
        promotion.id,
        Some(user.id),
        None,
    )
    .await?;
    Ok(())
}

async fn delete_user(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    state
        .storage
        .database
        .soft_delete_user(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("User deleted")))
}

async fn restore_user(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let restored = state
        .storage
        .database
        .restore_user(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(restored, "User restored")))
}

async fn force_delete_user(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    state
        .storage
        .database
        .force_delete_user(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("User permanently deleted")))
}

async fn update_user_password(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<UpdatePasswordRequest>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    Validator::validate_password(&request.password)?;

    let user_id = path.into_inner();
    let db = &state.storage.database;
    db.find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let password_hash = hash_password(&request.password)?;
    db.update_user_password(user_id, &password_hash).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Password updated")))
}

async fn link_student(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let (user_id, student_id) = path.into_inner();
    let db = &state.storage.database;

    db.find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let linked = db.link_student_to_user(student_id, user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        linked,
        "User linked to student",
    )))
}
