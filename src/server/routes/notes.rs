//! Note management: admin CRUD, the teacher's module-scoped surface (with
//! CSV import) and the student's self-scoped view

use crate::auth::identity::AuthSession;
use crate::auth::scope::authorize_module;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::database::entities::{module, note, student};
use crate::storage::database::{NoteDetail, NoteFilter};
use crate::utils::error::{ApiError, Result};
use crate::utils::validation::Validator;
use actix_web::{web, HttpResponse};
use futures::StreamExt as _;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_notes))
        .route("", web::post().to(create_note))
        .route("/student/my", web::get().to(my_notes))
        .route("/module/{module_id}", web::get().to(notes_by_module))
        .route("/module/{module_id}/add", web::post().to(add_for_module))
        .route(
            "/module/{module_id}/import",
            web::post().to(import_for_module),
        )
        .route(
            "/module/{module_id}/{note_id}",
            web::put().to(update_for_module),
        )
        .route(
            "/module/{module_id}/{note_id}",
            web::delete().to(delete_for_module),
        )
        .route("/{id}", web::get().to(get_note))
        .route("/{id}", web::put().to(update_note))
        .route("/{id}", web::delete().to(delete_note));
}

/// Note row with student and module context
#[derive(Debug, Serialize)]
pub struct NoteView {
    #[serde(flatten)]
    pub note: note::Model,
    pub student: Option<student::Model>,
    pub module: Option<module::Model>,
}

impl From<NoteDetail> for NoteView {
    fn from((note, student, module): NoteDetail) -> Self {
        Self {
            note,
            student,
            module,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub module_id: Option<String>,
    pub promotion_id: Option<String>,
    pub session: Option<String>,
    pub semester: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub student_id: Uuid,
    pub module_id: Uuid,
    pub ce: Option<f32>,
    pub fe: Option<f32>,
    pub session: Option<String>,
    pub semester: Option<i32>,
    pub appreciation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub ce: Option<f32>,
    pub fe: Option<f32>,
    pub session: Option<String>,
    pub semester: Option<i32>,
    pub appreciation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleNoteRequest {
    pub student_id: Uuid,
    pub ce: Option<f32>,
    pub fe: Option<f32>,
    pub session: Option<String>,
    pub semester: Option<i32>,
    pub appreciation: Option<String>,
}

fn validate_marks(ce: Option<f32>, fe: Option<f32>, semester: Option<i32>) -> Result<()> {
    Validator::validate_mark("ce", ce)?;
    Validator::validate_mark("fe", fe)?;
    if let Some(semester) = semester {
        Validator::validate_semester(semester)?;
    }
    Ok(())
}

/// "all" in a filter field means no constraint
fn filter_value(raw: Option<String>) -> Option<String> {
    raw.filter(|v| !v.is_empty() && v != "all")
}

/* ---- admin-family surface ---- */

async fn list_notes(
    state: web::Data<AppState>,
    session: AuthSession,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let query = query.into_inner();

    let filter = NoteFilter {
        session: filter_value(query.session),
        semester: filter_value(query.semester).and_then(|s| s.parse().ok()),
        module_id: filter_value(query.module_id).and_then(|s| s.parse().ok()),
        promotion_id: filter_value(query.promotion_id).and_then(|s| s.parse().ok()),
        search: filter_value(query.search),
    };

    let notes = state.storage.database.list_notes(&filter).await?;
    let data: Vec<NoteView> = notes.into_iter().map(NoteView::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

async fn get_note(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let found = state
        .storage
        .database
        .find_note_detail(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(NoteView::from(found))))
}

async fn create_note(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<CreateNoteRequest>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();
    validate_marks(request.ce, request.fe, request.semester)?;

    let db = &state.storage.database;
    db.find_student(request.student_id)
        .await?
        .ok_or_else(|| ApiError::validation("Unknown studentId"))?;
    db.find_module(request.module_id)
        .await?
        .ok_or_else(|| ApiError::validation("Unknown moduleId"))?;

    let created = db
        .create_note(
            request.student_id,
            request.module_id,
            request.ce,
            request.fe,
            request.session,
            request.semester,
            request.appreciation,
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(created, "Note created")))
}

async fn update_note(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<UpdateNoteRequest>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();
    validate_marks(request.ce, request.fe, request.semester)?;

    let updated = state
        .storage
        .database
        .update_note(
            path.into_inner(),
            request.ce,
            request.fe,
            request.session,
            request.semester,
            request.appreciation.map(Some),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(updated, "Note updated")))
}

async fn delete_note(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    state
        .storage
        .database
        .delete_note(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Note deleted")))
}

/* ---- teacher surface, module-scoped ---- */

async fn notes_by_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;
    let module = authorize_module(db, &session, path.into_inner()).await?;

    let notes = db.list_notes_by_module(module.id).await?;
    let data: Vec<NoteView> = notes.into_iter().map(NoteView::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(data, "Module notes")))
}

async fn add_for_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<ModuleNoteRequest>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let request = request.into_inner();
    validate_marks(request.ce, request.fe, request.semester)?;

    let db = &state.storage.database;
    let module = authorize_module(db, &session, path.into_inner()).await?;

    db.find_student(request.student_id)
        .await?
        .ok_or_else(|| ApiError::validation("Unknown studentId"))?;

    let created = db
        .create_note(
            request.student_id,
            module.id,
            request.ce,
            request.fe,
            request.session,
            request.semester,
            request.appreciation,
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(created, "Note added")))
}

async fn update_for_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<UpdateNoteRequest>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let (module_id, note_id) = path.into_inner();
    let request = request.into_inner();
    validate_marks(request.ce, request.fe, request.semester)?;

    let db = &state.storage.database;
    let module = authorize_module(db, &session, module_id).await?;

    let note = db
        .find_note(note_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    if note.module_id != module.id {
        return Err(ApiError::not_found("Note not found"));
    }

    let updated = db
        .update_note(
            note.id,
            request.ce,
            request.fe,
            request.session,
            request.semester,
            request.appreciation.map(Some),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(updated, "Note updated")))
}

async fn delete_for_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let (module_id, note_id) = path.into_inner();

    let db = &state.storage.database;
    let module = authorize_module(db, &session, module_id).await?;

    let note = db
        .find_note(note_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    if note.module_id != module.id {
        return Err(ApiError::not_found("Note not found"));
    }

    db.delete_note(note.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Note deleted")))
}

/* ---- CSV import ---- */

#[derive(Debug, Deserialize)]
struct CsvNoteRow {
    matricule: String,
    ce: Option<f32>,
    fe: Option<f32>,
    session: Option<String>,
    semester: Option<i32>,
    appreciation: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub line: u64,
    pub matricule: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub failed: Vec<ImportFailure>,
}

/// Import notes for a module from an uploaded CSV with columns
/// `matricule,ce,fe,session,semester,appreciation`. Rows are independent:
/// a bad row is reported and skipped, never aborts the batch.
async fn import_for_module(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    payload: actix_multipart::Multipart,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let db = &state.storage.database;
    let module = authorize_module(db, &session, path.into_inner()).await?;

    let file = super::uploads::read_first_file(payload, 1024 * 1024).await?;

    let mut reader = csv_async::AsyncReaderBuilder::new()
        .trim(csv_async::Trim::All)
        .create_deserializer(file.bytes.as_slice());

    let mut imported = 0usize;
    let mut failed = Vec::new();
    let mut line = 1u64;

    let mut records = reader.deserialize::<CsvNoteRow>();
    while let Some(record) = records.next().await {
        line += 1;
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                failed.push(ImportFailure {
                    line,
                    matricule: String::new(),
                    error: format!("Unparsable row: {}", e),
                });
                continue;
            }
        };

        if let Err(e) = validate_marks(row.ce, row.fe, row.semester) {
            failed.push(ImportFailure {
                line,
                matricule: row.matricule,
                error: e.to_string(),
            });
            continue;
        }

        let student = match db.find_student_by_matricule(&row.matricule).await? {
            Some(student) => student,
            None => {
                failed.push(ImportFailure {
                    line,
                    matricule: row.matricule,
                    error: "Unknown matricule".to_string(),
                });
                continue;
            }
        };

        db.create_note(
            student.id,
            module.id,
            row.ce,
            row.fe,
            row.session,
            row.semester,
            row.appreciation,
        )
        .await?;
        imported += 1;
    }

    info!(
        "CSV import for module {}: {} imported, {} failed",
        module.code,
        imported,
        failed.len()
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        ImportReport { imported, failed },
        "Import finished",
    )))
}

/* ---- student surface ---- */

/// The caller's own notes; self-scoped, no cross-student path exists
async fn my_notes(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    let student_id = session.require_linked_student()?;
    let notes = state
        .storage
        .database
        .list_notes_by_student(student_id)
        .await?;
    let data: Vec<NoteView> = notes.into_iter().map(NoteView::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}
