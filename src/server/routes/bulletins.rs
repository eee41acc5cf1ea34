//! Bulletin (report card) management — admin family only

use crate::auth::identity::AuthSession;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::database::entities::{bulletin, student};
use crate::utils::error::{ApiError, Result};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_bulletins))
        .route("", web::post().to(create_bulletin))
        .route("/{id}", web::get().to(get_bulletin))
        .route("/{id}", web::put().to(update_bulletin))
        .route("/{id}", web::delete().to(delete_bulletin));
}

#[derive(Debug, Serialize)]
pub struct BulletinView {
    #[serde(flatten)]
    pub bulletin: bulletin::Model,
    pub student: Option<student::Model>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletinPayload {
    pub term: Option<String>,
    pub average: Option<f32>,
    pub student_id: Option<Uuid>,
}

async fn list_bulletins(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let bulletins = state.storage.database.list_bulletins().await?;
    let data: Vec<BulletinView> = bulletins
        .into_iter()
        .map(|(b, s)| BulletinView {
            bulletin: b,
            student: s,
        })
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

async fn get_bulletin(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let (bulletin, student) = state
        .storage
        .database
        .find_bulletin(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Bulletin not found"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(BulletinView { bulletin, student })))
}

async fn create_bulletin(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<BulletinPayload>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();

    let term = request
        .term
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("Term is required"))?;

    let created = state
        .storage
        .database
        .create_bulletin(term, request.average, request.student_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

async fn update_bulletin(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<BulletinPayload>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();
    let updated = state
        .storage
        .database
        .update_bulletin(
            path.into_inner(),
            request.term,
            request.average.map(Some),
            request.student_id.map(Some),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

async fn delete_bulletin(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    state
        .storage
        .database
        .delete_bulletin(path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
