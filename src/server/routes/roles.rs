//! Role management (admin only)

use crate::auth::identity::AuthSession;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::{ApiError, Result};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_roles))
        .route("", web::post().to(create_role))
        .route("/{id}", web::get().to(get_role))
        .route("/{id}", web::put().to(update_role))
        .route("/{id}", web::delete().to(delete_role));
}

#[derive(Debug, Deserialize)]
pub struct RolePayload {
    pub name: String,
}

async fn list_roles(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_admin()?;
    let roles = state.storage.database.list_roles().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(roles)))
}

async fn get_role(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    session.require_admin()?;
    let role = state
        .storage
        .database
        .find_role(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Role not found"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(role)))
}

async fn create_role(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<RolePayload>,
) -> Result<HttpResponse> {
    session.require_admin()?;
    let name = request.name.trim().to_lowercase();
    if name.is_empty() {
        return Err(ApiError::validation("Role name is required"));
    }
    let role = state.storage.database.create_role(&name).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(role)))
}

async fn update_role(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<i32>,
    request: web::Json<RolePayload>,
) -> Result<HttpResponse> {
    session.require_admin()?;
    let name = request.name.trim().to_lowercase();
    if name.is_empty() {
        return Err(ApiError::validation("Role name is required"));
    }
    let role = state
        .storage
        .database
        .update_role(path.into_inner(), &name)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(role)))
}

async fn delete_role(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    session.require_admin()?;
    state
        .storage
        .database
        .delete_role(path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
