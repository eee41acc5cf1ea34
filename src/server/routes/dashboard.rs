//! Dashboard statistics

use crate::auth::identity::{AuthSession, Identity};
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_web::{web, HttpResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/stats", web::get().to(stats));
}

/// Entity counts; students get their personal counters, everyone else the
/// global ones
async fn stats(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    let db = &state.storage.database;

    match &session.identity {
        Identity::Student(profile) => {
            let stats = db.student_stats(profile.id).await?;
            Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
        }
        Identity::UnlinkedStudent => {
            let profile = session.require_student_profile()?;
            let stats = db.student_stats(profile.id).await?;
            Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
        }
        _ => {
            let stats = db.global_stats().await?;
            Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
        }
    }
}
