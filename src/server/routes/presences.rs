//! Séances and attendance
//!
//! The teacher surface is module-scoped: every operation resolves the module
//! and checks ownership before touching séances or presence rows. Students
//! only ever see their own history.

use crate::auth::identity::AuthSession;
use crate::auth::scope::authorize_module;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::database::entities::{module, presence, seance, student};
use crate::utils::error::{ApiError, Result};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const STATUTS: &[&str] = &["present", "absent", "retard", "justifie"];

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(upsert_presence))
        .route("/seance", web::post().to(create_seance))
        .route("/seances/by-module/{module_id}", web::get().to(seances_by_module))
        .route("/seance/{id}", web::get().to(get_seance))
        .route("/seance/{id}", web::put().to(update_seance))
        .route("/seance/{id}", web::delete().to(delete_seance))
        .route("/by-module/{module_id}", web::get().to(by_module))
        .route("/by-seance/{seance_id}", web::get().to(by_seance))
        .route("/stats/module/{module_id}", web::get().to(stats_by_module))
        .route("/stats/seance/{seance_id}", web::get().to(stats_by_seance))
        .route("/me", web::get().to(my_presences))
        .route("/student/my", web::get().to(my_presences))
        .route("/{id}", web::delete().to(delete_presence));
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeancePayload {
    pub module_id: Uuid,
    pub date: chrono::NaiveDate,
    pub titre: Option<String>,
    pub heure_debut: Option<String>,
    pub heure_fin: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeanceUpdatePayload {
    pub date: Option<chrono::NaiveDate>,
    pub titre: Option<String>,
    pub heure_debut: Option<String>,
    pub heure_fin: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub student_id: Uuid,
    pub module_id: Uuid,
    pub seance_id: Option<Uuid>,
    pub date: Option<chrono::NaiveDate>,
    pub statut: String,
    pub motif: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PresenceView {
    #[serde(flatten)]
    pub presence: presence::Model,
    pub student: Option<student::Model>,
    pub seance: Option<seance::Model>,
}

/// Roster entry: either a recorded presence or the default absent row
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: Option<Uuid>,
    pub student_id: Uuid,
    pub student: student::Model,
    pub statut: String,
    pub motif: Option<String>,
    pub seance_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct StudentPresenceView {
    #[serde(flatten)]
    pub presence: presence::Model,
    pub module: Option<module::Model>,
    pub seance: Option<seance::Model>,
}

/* ---- séances ---- */

async fn create_seance(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<SeancePayload>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let request = request.into_inner();
    let db = &state.storage.database;

    let module = authorize_module(db, &session, request.module_id).await?;
    let created = db
        .create_seance(
            module.id,
            session.teacher_id(),
            request.date,
            request.titre,
            request.heure_debut,
            request.heure_fin,
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

async fn seances_by_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;
    let module = authorize_module(db, &session, path.into_inner()).await?;
    let seances = db.list_seances_by_module(module.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(seances)))
}

async fn get_seance(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let (seance, module) = state
        .storage
        .database
        .find_seance_with_module(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Séance not found"))?;

    #[derive(Serialize)]
    struct SeanceView {
        #[serde(flatten)]
        seance: seance::Model,
        module: Option<module::Model>,
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(SeanceView { seance, module })))
}

async fn update_seance(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<SeanceUpdatePayload>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let request = request.into_inner();
    let db = &state.storage.database;

    let seance = db
        .find_seance(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Séance not found"))?;
    authorize_module(db, &session, seance.module_id).await?;

    let updated = db
        .update_seance(
            seance.id,
            request.date,
            request.titre.map(Some),
            request.heure_debut,
            request.heure_fin,
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

async fn delete_seance(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;

    let seance = db
        .find_seance(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Séance not found"))?;
    authorize_module(db, &session, seance.module_id).await?;

    db.delete_seance(seance.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message(
        "Séance deleted together with its presences",
    )))
}

/* ---- presences ---- */

/// Record or update one student's attendance. With only a date given, the
/// séance for that module and date is created on the fly.
async fn upsert_presence(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<PresencePayload>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let request = request.into_inner();

    if !STATUTS.contains(&request.statut.as_str()) {
        return Err(ApiError::validation(
            "statut must be present, absent, retard or justifie",
        ));
    }

    let db = &state.storage.database;
    let module = authorize_module(db, &session, request.module_id).await?;

    db.find_student(request.student_id)
        .await?
        .ok_or_else(|| ApiError::validation("Unknown studentId"))?;

    let seance_id = match (request.seance_id, request.date) {
        (Some(seance_id), _) => {
            let seance = db
                .find_seance(seance_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Séance not found"))?;
            if seance.module_id != module.id {
                return Err(ApiError::validation(
                    "Séance does not belong to this module",
                ));
            }
            seance.id
        }
        (None, Some(date)) => match db.find_seance_by_module_and_date(module.id, date).await? {
            Some(seance) => seance.id,
            None => {
                db.create_seance(module.id, session.teacher_id(), date, None, None, None)
                    .await?
                    .id
            }
        },
        (None, None) => {
            return Err(ApiError::validation("seanceId or date is required"));
        }
    };

    match db
        .find_presence_for_seance(request.student_id, module.id, seance_id)
        .await?
    {
        Some(existing) => {
            let updated = db
                .update_presence(
                    existing.id,
                    request.statut,
                    request.motif,
                    session.teacher_id(),
                )
                .await?;
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
        }
        None => {
            let created = db
                .create_presence(
                    request.student_id,
                    module.id,
                    session.teacher_id(),
                    seance_id,
                    request.statut,
                    request.motif,
                )
                .await?;
            Ok(HttpResponse::Created().json(ApiResponse::success(created)))
        }
    }
}

async fn delete_presence(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;

    let presence = db
        .find_presence(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Presence not found"))?;
    authorize_module(db, &session, presence.module_id).await?;

    db.delete_presence(presence.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Presence deleted")))
}

/// Promotion roster merged with the recorded rows: students with no row yet
/// appear as default absences
async fn by_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;
    let module = authorize_module(db, &session, path.into_inner()).await?;

    let students = match module.promotion_id {
        Some(promotion_id) => db.list_students_by_promotion(promotion_id).await?,
        None => Vec::new(),
    };
    let presences = db.list_presences_by_module(module.id).await?;

    let roster: Vec<RosterEntry> = students
        .into_iter()
        .map(|(student, _, _, _)| {
            match presences.iter().find(|(p, _, _)| p.student_id == student.id) {
                Some((p, _, _)) => RosterEntry {
                    id: Some(p.id),
                    student_id: student.id,
                    student,
                    statut: p.statut.clone(),
                    motif: p.motif.clone(),
                    seance_id: Some(p.seance_id),
                },
                None => RosterEntry {
                    id: None,
                    student_id: student.id,
                    student,
                    statut: "absent".to_string(),
                    motif: None,
                    seance_id: None,
                },
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(roster)))
}

async fn by_seance(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;

    let seance = db
        .find_seance(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Séance not found"))?;
    authorize_module(db, &session, seance.module_id).await?;

    let presences = db.list_presences_by_seance(seance.id).await?;
    let data: Vec<PresenceView> = presences
        .into_iter()
        .map(|(p, st, se)| PresenceView {
            presence: p,
            student: st,
            seance: se,
        })
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

async fn stats_by_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;
    let module = authorize_module(db, &session, path.into_inner()).await?;
    let stats = db.presence_stats_by_module(module.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

async fn stats_by_seance(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;

    let seance = db
        .find_seance(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Séance not found"))?;
    authorize_module(db, &session, seance.module_id).await?;

    let stats = db.presence_stats_by_seance(seance.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

/* ---- student surface ---- */

/// The caller's own attendance history
async fn my_presences(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    let student_id = session.require_linked_student()?;
    let rows = state
        .storage
        .database
        .list_presences_by_student(student_id)
        .await?;
    let data: Vec<StudentPresenceView> = rows
        .into_iter()
        .map(|(p, m, s)| StudentPresenceView {
            presence: p,
            module: m,
            seance: s,
        })
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}
