//! Module resources: metadata CRUD plus file upload

use crate::auth::identity::AuthSession;
use crate::auth::scope::authorize_module;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::{ApiError, Result};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

const KINDS: &[&str] = &["video", "pdf", "document", "other"];

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_resources))
        .route("", web::post().to(create_resource))
        .route("/upload", web::post().to(upload_resource))
        .route("/by-module/{module_id}", web::get().to(by_module))
        .route("/{id}", web::get().to(get_resource))
        .route("/{id}", web::put().to(update_resource))
        .route("/{id}", web::delete().to(delete_resource));
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePayload {
    pub title: Option<String>,
    #[serde(alias = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub module_id: Option<Uuid>,
}

fn validate_kind(kind: &str) -> Result<()> {
    if !KINDS.contains(&kind) {
        return Err(ApiError::validation(
            "type must be video, pdf, document or other",
        ));
    }
    Ok(())
}

async fn list_resources(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let resources = state.storage.database.list_resources().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(resources)))
}

async fn by_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;
    let module = authorize_module(db, &session, path.into_inner()).await?;
    let resources = db.list_resources_by_module(module.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        resources,
        "Module resources",
    )))
}

async fn get_resource(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let resource = state
        .storage
        .database
        .find_resource(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Resource not found"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(resource)))
}

async fn create_resource(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<ResourcePayload>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let request = request.into_inner();

    let (Some(title), Some(url), Some(module_id)) =
        (request.title, request.url, request.module_id)
    else {
        return Err(ApiError::validation("title, url and moduleId are required"));
    };
    let kind = request.kind.unwrap_or_else(|| "document".to_string());
    validate_kind(&kind)?;

    let db = &state.storage.database;
    // Teachers may only attach resources to their own modules
    let module = authorize_module(db, &session, module_id).await?;

    let created = db
        .create_resource(
            title,
            kind,
            url,
            request.description,
            Some(module.id),
            Some(session.user.id),
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        created,
        "Resource created",
    )))
}

async fn update_resource(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<ResourcePayload>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let request = request.into_inner();
    let db = &state.storage.database;

    let existing = db
        .find_resource(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Resource not found"))?;
    if let Some(module_id) = existing.module_id {
        authorize_module(db, &session, module_id).await?;
    } else {
        session.require_admin_family()?;
    }
    if let Some(kind) = request.kind.as_deref() {
        validate_kind(kind)?;
    }

    let updated = db
        .update_resource(
            existing.id,
            request.title,
            request.kind,
            request.url,
            request.description.map(Some),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        updated,
        "Resource updated",
    )))
}

async fn delete_resource(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;

    let existing = db
        .find_resource(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Resource not found"))?;
    if let Some(module_id) = existing.module_id {
        authorize_module(db, &session, module_id).await?;
    } else {
        session.require_admin_family()?;
    }

    db.delete_resource(existing.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Resource deleted")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    pub module_id: Uuid,
    pub title: Option<String>,
    #[serde(alias = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
}

/// Upload a file and register it as a resource of the module in one call
async fn upload_resource(
    state: web::Data<AppState>,
    session: AuthSession,
    query: web::Query<UploadQuery>,
    payload: actix_multipart::Multipart,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let query = query.into_inner();
    let db = &state.storage.database;

    let module = authorize_module(db, &session, query.module_id).await?;

    let kind = query.kind.unwrap_or_else(|| "document".to_string());
    validate_kind(&kind)?;

    let file = super::uploads::read_first_file(payload, 20 * 1024 * 1024).await?;
    let url = state
        .storage
        .files
        .store_resource(&file.filename, &file.bytes)
        .await?;

    let created = db
        .create_resource(
            query.title.unwrap_or_else(|| file.filename.clone()),
            kind,
            url,
            query.description,
            Some(module.id),
            Some(session.user.id),
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        created,
        "File uploaded and resource created",
    )))
}
