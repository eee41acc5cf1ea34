//! Teacher management

use crate::auth::identity::AuthSession;
use crate::auth::password::hash_password;
use crate::domain::RoleKind;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::database::entities::{module, teacher, user};
use crate::storage::database::NewUser;
use crate::utils::error::{ApiError, Result};
use crate::utils::validation::Validator;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_teachers))
        .route("", web::post().to(create_teacher))
        .route("/link-user/{teacher_id}", web::put().to(link_user))
        .route("/{id}", web::get().to(get_teacher))
        .route("/{id}", web::put().to(update_teacher))
        .route("/{id}", web::delete().to(delete_teacher))
        .route("/{id}/photo", web::post().to(upload_photo));
}

/// Teacher row with account fields merged in for the frontend
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherView {
    #[serde(flatten)]
    pub teacher: teacher::Model,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<module::Model>>,
}

impl TeacherView {
    fn new(
        teacher: teacher::Model,
        user: Option<user::Model>,
        modules: Option<Vec<module::Model>>,
    ) -> Self {
        Self {
            username: user.as_ref().map(|u| u.username.clone()),
            email: user.as_ref().map(|u| u.email.clone()),
            phone: user.as_ref().and_then(|u| u.phone.clone()),
            teacher,
            modules,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacherRequest {
    pub nom: String,
    pub prenom: Option<String>,
    pub grade: Option<String>,
    pub specialite: Option<String>,
    pub user_id: Option<Uuid>,
    /// When true, also create a linked user account in the same call
    #[serde(default)]
    pub create_user: bool,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeacherRequest {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub grade: Option<String>,
    pub specialite: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkUserRequest {
    pub user_id: Uuid,
}

async fn list_teachers(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;
    let teachers = db.list_teachers().await?;

    let mut data = Vec::with_capacity(teachers.len());
    for (t, u) in teachers {
        let modules = db
            .list_modules_by_teacher(t.id)
            .await?
            .into_iter()
            .map(|(m, _, _, _)| m)
            .collect();
        data.push(TeacherView::new(t, u, Some(modules)));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

async fn get_teacher(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;
    let (teacher, user) = db
        .find_teacher_with_user(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))?;

    let modules = db
        .list_modules_by_teacher(teacher.id)
        .await?
        .into_iter()
        .map(|(m, _, _, _)| m)
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(TeacherView::new(
        teacher,
        user,
        Some(modules),
    ))))
}

/// Create a teacher, optionally with a fresh linked user account
async fn create_teacher(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<CreateTeacherRequest>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();

    if request.nom.trim().is_empty() {
        return Err(ApiError::validation("Name is required"));
    }

    let db = &state.storage.database;
    let teacher_role = db
        .find_role_by_name(RoleKind::Teacher.as_str())
        .await?
        .ok_or_else(|| ApiError::internal("The teacher role does not exist in the store"))?;

    let mut final_user_id = request.user_id;

    if request.create_user {
        let (Some(username), Some(email), Some(password)) =
            (&request.username, &request.email, &request.password)
        else {
            return Err(ApiError::validation(
                "username, email and password are required to create an account",
            ));
        };
        let username = username.trim().to_string();
        let email = email.trim().to_lowercase();
        Validator::validate_username(&username)?;
        Validator::validate_email(&email)?;
        Validator::validate_password(password)?;

        if db.find_user_by_email(&email).await?.is_some() {
            return Err(ApiError::conflict("Email already in use"));
        }
        if db.find_user_by_username(&username).await?.is_some() {
            return Err(ApiError::conflict("Username already in use"));
        }

        let created = db
            .create_user(NewUser {
                username,
                email,
                password_hash: hash_password(password)?,
                phone: request.phone.clone(),
                photo_url: None,
                status: "active".to_string(),
                role_id: Some(teacher_role.id),
            })
            .await?;
        final_user_id = Some(created.id);
    } else if let Some(user_id) = final_user_id {
        if db.find_teacher_by_user_id(user_id).await?.is_some() {
            return Err(ApiError::conflict(
                "This user is already linked to a teacher",
            ));
        }
        // The linked account always carries the teacher role
        db.update_user(
            user_id,
            None,
            None,
            None,
            None,
            None,
            Some(Some(teacher_role.id)),
            None,
        )
        .await?;
    }

    let created = db
        .create_teacher(
            request.nom,
            request.prenom,
            request.grade,
            request.specialite,
            final_user_id,
        )
        .await?;

    let (teacher, user) = db
        .find_teacher_with_user(created.id)
        .await?
        .ok_or_else(|| ApiError::internal("Created teacher vanished"))?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        TeacherView::new(teacher, user, None),
        "Teacher created",
    )))
}

async fn update_teacher(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<UpdateTeacherRequest>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let teacher_id = path.into_inner();
    let request = request.into_inner();
    let db = &state.storage.database;

    let existing = db
        .find_teacher(teacher_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))?;

    if let Some(user_id) = request.user_id {
        if Some(user_id) != existing.user_id {
            if let Some(link) = db.find_teacher_by_user_id(user_id).await? {
                if link.id != existing.id {
                    return Err(ApiError::conflict(
                        "This user is already linked to another teacher",
                    ));
                }
            }
            if let Some(role) = db.find_role_by_name(RoleKind::Teacher.as_str()).await? {
                db.update_user(user_id, None, None, None, None, None, Some(Some(role.id)), None)
                    .await?;
            }
        }
    }

    let updated = db
        .update_teacher(
            teacher_id,
            request.nom,
            Some(request.prenom),
            Some(request.grade),
            Some(request.specialite),
            Some(request.user_id),
        )
        .await?;

    let (teacher, user) = db
        .find_teacher_with_user(updated.id)
        .await?
        .ok_or_else(|| ApiError::internal("Updated teacher vanished"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        TeacherView::new(teacher, user, None),
        "Teacher updated",
    )))
}

async fn delete_teacher(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    state
        .storage
        .database
        .delete_teacher(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Teacher deleted")))
}

async fn link_user(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<LinkUserRequest>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let teacher_id = path.into_inner();
    let db = &state.storage.database;

    db.find_user_by_id(request.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    // Linking forces the account onto the teacher role
    if let Some(role) = db.find_role_by_name(RoleKind::Teacher.as_str()).await? {
        db.update_user(
            request.user_id,
            None,
            None,
            None,
            None,
            None,
            Some(Some(role.id)),
            None,
        )
        .await?;
    }

    let linked = db.link_teacher_to_user(teacher_id, request.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(linked, "Link created")))
}

async fn upload_photo(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    payload: actix_multipart::Multipart,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let teacher_id = path.into_inner();
    let db = &state.storage.database;

    db.find_teacher(teacher_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))?;

    let url = super::uploads::save_photo_from_multipart(&state, payload).await?;
    let updated = db.set_teacher_photo(teacher_id, &url).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        serde_json::json!({ "photoUrl": updated.photo_url }),
        "Teacher photo updated",
    )))
}
