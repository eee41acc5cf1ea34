//! Filière management

use crate::auth::identity::AuthSession;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::{ApiError, Result};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_filieres))
        .route("", web::post().to(create_filiere))
        .route("/{id}", web::put().to(update_filiere))
        .route("/{id}", web::delete().to(delete_filiere));
}

#[derive(Debug, Deserialize)]
pub struct FilierePayload {
    pub nom: Option<String>,
    pub description: Option<String>,
}

async fn list_filieres(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_teacher()?;
    let filieres = state.storage.database.list_filieres().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(filieres)))
}

async fn create_filiere(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<FilierePayload>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();

    let nom = request
        .nom
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("Filière name is required"))?;

    let db = &state.storage.database;
    if db.find_filiere_by_name(&nom).await?.is_some() {
        return Err(ApiError::conflict("Filière already exists"));
    }

    let created = db
        .create_filiere(
            nom,
            Some(
                request
                    .description
                    .map(|d| d.trim().to_string())
                    .unwrap_or_default(),
            ),
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(created, "Filière created")))
}

async fn update_filiere(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<i32>,
    request: web::Json<FilierePayload>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let filiere_id = path.into_inner();
    let request = request.into_inner();
    let db = &state.storage.database;

    if let Some(nom) = request.nom.as_deref() {
        if let Some(other) = db.find_filiere_by_name(nom.trim()).await? {
            if other.id != filiere_id {
                return Err(ApiError::conflict("Filière name already in use"));
            }
        }
    }

    let updated = db
        .update_filiere(
            filiere_id,
            request.nom.map(|n| n.trim().to_string()),
            request.description.map(|d| d.trim().to_string()),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(updated, "Filière updated")))
}

async fn delete_filiere(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    state
        .storage
        .database
        .delete_filiere(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Filière deleted")))
}
