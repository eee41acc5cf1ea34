//! Timetable management

use crate::auth::identity::AuthSession;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::database::entities::schedule;
use crate::utils::error::{ApiError, Result};
use actix_web::{web, HttpResponse};
use sea_orm::ActiveValue::Set;
use serde::Deserialize;
use uuid::Uuid;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_schedules))
        .route("", web::post().to(create_schedule))
        .route("/my", web::get().to(my_schedules))
        .route("/student/my", web::get().to(student_schedules))
        .route("/{id}", web::get().to(get_schedule))
        .route("/{id}", web::put().to(update_schedule))
        .route("/{id}", web::delete().to(delete_schedule));
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePayload {
    pub title: Option<String>,
    pub module_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub promotion_id: Option<i32>,
    pub room: Option<String>,
    #[serde(alias = "type")]
    pub kind: Option<String>,
    pub start: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub end: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub color: Option<String>,
    pub notes: Option<String>,
}

async fn list_schedules(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    let _ = &session; // any authenticated caller
    let schedules = state.storage.database.list_schedules().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(schedules)))
}

/// Slots of the calling teacher
async fn my_schedules(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_teacher()?;
    let profile = session.require_teacher_profile()?;
    let schedules = state
        .storage
        .database
        .list_schedules_by_teacher(profile.id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(schedules)))
}

/// Slots of the calling student's promotion
async fn student_schedules(
    state: web::Data<AppState>,
    session: AuthSession,
) -> Result<HttpResponse> {
    session.require_student()?;
    let profile = session.require_student_profile()?;
    let schedules = state
        .storage
        .database
        .list_schedules_by_promotion(profile.promotion_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(schedules)))
}

async fn get_schedule(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let _ = &session;
    let schedule = state
        .storage
        .database
        .find_schedule(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Schedule not found"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(schedule)))
}

async fn create_schedule(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<SchedulePayload>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();

    let title = request
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("Title is required"))?;
    let (Some(start), Some(end)) = (request.start, request.end) else {
        return Err(ApiError::validation("start and end are required"));
    };
    if end <= start {
        return Err(ApiError::validation("end must be after start"));
    }

    let created = state
        .storage
        .database
        .create_schedule(schedule::ActiveModel {
            title: Set(title),
            module_id: Set(request.module_id),
            teacher_id: Set(request.teacher_id),
            promotion_id: Set(request.promotion_id),
            room: Set(request.room),
            kind: Set(request.kind),
            start: Set(start),
            end: Set(end),
            color: Set(request.color),
            notes: Set(request.notes),
            ..Default::default()
        })
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

async fn update_schedule(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<SchedulePayload>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let schedule_id = path.into_inner();
    let request = request.into_inner();
    let db = &state.storage.database;

    let existing = db
        .find_schedule(schedule_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Schedule not found"))?;

    let start = request.start.unwrap_or(existing.start);
    let end = request.end.unwrap_or(existing.end);
    if end <= start {
        return Err(ApiError::validation("end must be after start"));
    }

    let updated = db
        .update_schedule(
            schedule_id,
            schedule::ActiveModel {
                title: Set(request.title.unwrap_or_else(|| existing.title.clone())),
                module_id: Set(request.module_id.or(existing.module_id)),
                teacher_id: Set(request.teacher_id.or(existing.teacher_id)),
                promotion_id: Set(request.promotion_id.or(existing.promotion_id)),
                room: Set(request.room.or_else(|| existing.room.clone())),
                kind: Set(request.kind.or_else(|| existing.kind.clone())),
                start: Set(start),
                end: Set(end),
                color: Set(request.color.or_else(|| existing.color.clone())),
                notes: Set(request.notes.or_else(|| existing.notes.clone())),
                ..Default::default()
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

async fn delete_schedule(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    state
        .storage
        .database
        .delete_schedule(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Schedule deleted")))
}
