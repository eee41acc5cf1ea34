//! Promotion management

use crate::auth::identity::AuthSession;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::database::entities::{filiere, promotion};
use crate::utils::error::{ApiError, Result};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_promotions))
        .route("", web::post().to(create_promotion))
        .route("/by-filiere/{filiere_id}", web::get().to(by_filiere))
        .route("/{id}", web::get().to(get_promotion))
        .route("/{id}", web::put().to(update_promotion))
        .route("/{id}", web::delete().to(delete_promotion));
}

#[derive(Debug, Serialize)]
pub struct PromotionView {
    #[serde(flatten)]
    pub promotion: promotion::Model,
    pub filiere: Option<filiere::Model>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionPayload {
    pub nom: Option<String>,
    pub annee: Option<i32>,
    pub filiere_id: Option<i32>,
}

async fn list_promotions(
    state: web::Data<AppState>,
    session: AuthSession,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let promotions = state.storage.database.list_promotions().await?;
    let data: Vec<PromotionView> = promotions
        .into_iter()
        .map(|(p, f)| PromotionView {
            promotion: p,
            filiere: f,
        })
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

async fn by_filiere(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let promotions = state
        .storage
        .database
        .list_promotions_by_filiere(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(promotions)))
}

async fn get_promotion(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let (promotion, filiere) = state
        .storage
        .database
        .find_promotion_with_filiere(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Promotion not found"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(PromotionView { promotion, filiere })))
}

async fn create_promotion(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<PromotionPayload>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();

    let (Some(nom), Some(annee)) = (request.nom, request.annee) else {
        return Err(ApiError::validation("nom and annee are required"));
    };
    if nom.trim().is_empty() {
        return Err(ApiError::validation("nom is required"));
    }

    let created = state
        .storage
        .database
        .create_promotion(nom.trim().to_string(), annee, request.filiere_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

async fn update_promotion(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<i32>,
    request: web::Json<PromotionPayload>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();
    let updated = state
        .storage
        .database
        .update_promotion(
            path.into_inner(),
            request.nom,
            request.annee,
            request.filiere_id.map(Some),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

async fn delete_promotion(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    state
        .storage
        .database
        .delete_promotion(path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
