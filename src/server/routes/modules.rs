//! Module management

use crate::auth::identity::AuthSession;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::database::entities::{filiere, module, promotion, teacher};
use crate::storage::database::ModuleDetail;
use crate::utils::error::{ApiError, Result};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_modules))
        .route("", web::post().to(create_module))
        .route("/my", web::get().to(my_modules))
        .route("/{id}", web::get().to(get_module))
        .route("/{id}", web::put().to(update_module))
        .route("/{id}", web::delete().to(delete_module));
}

/// Module row with its relations joined in
#[derive(Debug, Serialize)]
pub struct ModuleView {
    #[serde(flatten)]
    pub module: module::Model,
    pub teacher: Option<teacher::Model>,
    pub promotion: Option<PromotionView>,
}

#[derive(Debug, Serialize)]
pub struct PromotionView {
    #[serde(flatten)]
    pub promotion: promotion::Model,
    pub filiere: Option<filiere::Model>,
}

impl From<ModuleDetail> for ModuleView {
    fn from((module, teacher, promotion, filiere): ModuleDetail) -> Self {
        Self {
            module,
            teacher,
            promotion: promotion.map(|p| PromotionView {
                promotion: p,
                filiere,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModuleRequest {
    pub title: String,
    pub code: String,
    pub description: Option<String>,
    pub credits: Option<i32>,
    pub semester: Option<i32>,
    pub coefficient: Option<f32>,
    #[serde(default)]
    pub is_optional: bool,
    pub teacher_id: Option<Uuid>,
    pub promotion_id: Option<i32>,
    pub filiere_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModuleRequest {
    pub title: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub credits: Option<i32>,
    pub semester: Option<i32>,
    pub coefficient: Option<f32>,
    pub is_optional: Option<bool>,
    pub teacher_id: Option<Uuid>,
    pub promotion_id: Option<i32>,
    pub filiere_id: Option<i32>,
}

async fn list_modules(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_teacher()?;
    let modules = state.storage.database.list_modules().await?;
    let data: Vec<ModuleView> = modules.into_iter().map(ModuleView::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// Modules of the calling teacher; admin-family callers see everything
async fn my_modules(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;

    let modules = if session.require_admin_family().is_ok() {
        db.list_modules().await?
    } else {
        let profile = session.require_teacher_profile()?;
        db.list_modules_by_teacher(profile.id).await?
    };

    let data: Vec<ModuleView> = modules.into_iter().map(ModuleView::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        data,
        "Modules of the authenticated teacher",
    )))
}

async fn get_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let found = state
        .storage
        .database
        .find_module_detail(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Module not found"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(ModuleView::from(found))))
}

async fn create_module(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<CreateModuleRequest>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();

    if request.title.trim().is_empty() || request.code.trim().is_empty() {
        return Err(ApiError::validation(
            "Module title and code are required",
        ));
    }

    let db = &state.storage.database;
    if db.find_module_by_code(request.code.trim()).await?.is_some() {
        return Err(ApiError::conflict("Module code already exists"));
    }

    let created = db
        .create_module(
            request.title.trim().to_string(),
            request.code.trim().to_string(),
            request.description,
            request.credits.unwrap_or(0),
            request.semester.unwrap_or(1),
            request.coefficient.unwrap_or(1.0),
            request.is_optional,
            request.teacher_id,
            request.promotion_id,
            request.filiere_id,
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(created, "Module created")))
}

async fn update_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<UpdateModuleRequest>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let module_id = path.into_inner();
    let request = request.into_inner();
    let db = &state.storage.database;

    let existing = db
        .find_module(module_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Module not found"))?;

    use sea_orm::ActiveValue::Set;
    let changes = module::ActiveModel {
        title: Set(request.title.unwrap_or_else(|| existing.title.clone())),
        code: Set(request.code.unwrap_or_else(|| existing.code.clone())),
        description: Set(request.description.or_else(|| existing.description.clone())),
        credits: Set(request.credits.unwrap_or(existing.credits)),
        semester: Set(request.semester.unwrap_or(existing.semester)),
        coefficient: Set(request.coefficient.unwrap_or(existing.coefficient)),
        is_optional: Set(request.is_optional.unwrap_or(existing.is_optional)),
        teacher_id: Set(request.teacher_id.or(existing.teacher_id)),
        promotion_id: Set(request.promotion_id.or(existing.promotion_id)),
        filiere_id: Set(request.filiere_id.or(existing.filiere_id)),
        created_at: Set(existing.created_at),
        ..Default::default()
    };

    let updated = db.update_module(module_id, changes).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(updated, "Module updated")))
}

async fn delete_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    state
        .storage
        .database
        .delete_module(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Module deleted")))
}
