//! Student management and the student's own module view

use crate::auth::identity::AuthSession;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::database::entities::{filiere, module, promotion, resource, student, user};
use crate::storage::database::StudentDetail;
use crate::utils::error::{ApiError, Result};
use crate::utils::validation::Validator;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_students))
        .route("", web::post().to(create_student))
        .route("/mes-modules", web::get().to(my_modules))
        .route("/upload-photo", web::post().to(upload_photo))
        .route("/link", web::post().to(link_student))
        .route("/by-promotion/{promotion_id}", web::get().to(by_promotion))
        .route("/{id}", web::get().to(get_student))
        .route("/{id}", web::put().to(update_student))
        .route("/{id}", web::delete().to(delete_student));
}

/// Student row with promotion, filière and linked account joined in
#[derive(Debug, Serialize)]
pub struct StudentView {
    #[serde(flatten)]
    pub student: student::Model,
    pub promotion: Option<PromotionView>,
    pub user: Option<user::Model>,
}

#[derive(Debug, Serialize)]
pub struct PromotionView {
    #[serde(flatten)]
    pub promotion: promotion::Model,
    pub filiere: Option<filiere::Model>,
}

impl From<StudentDetail> for StudentView {
    fn from((student, promotion, filiere, user): StudentDetail) -> Self {
        Self {
            student,
            promotion: promotion.map(|p| PromotionView {
                promotion: p,
                filiere,
            }),
            user,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub nom: String,
    pub prenom: Option<String>,
    pub matricule: String,
    pub sexe: Option<String>,
    pub date_naissance: Option<String>,
    pub lieu_naissance: Option<String>,
    pub grade: Option<String>,
    pub etat_dossier: Option<String>,
    pub promotion_id: i32,
    pub user_id: Option<Uuid>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPayload {
    pub student_id: Uuid,
    pub user_id: Uuid,
}

fn parse_birth_date(raw: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse::<chrono::NaiveDate>()
            .map(Some)
            .map_err(|_| ApiError::validation("Invalid dateNaissance (expected YYYY-MM-DD)")),
    }
}

fn validate_enums(sexe: &Option<String>, etat_dossier: &Option<String>) -> Result<()> {
    if let Some(sexe) = sexe {
        if !["M", "F", "Autre"].contains(&sexe.as_str()) {
            return Err(ApiError::validation("sexe must be M, F or Autre"));
        }
    }
    if let Some(etat) = etat_dossier {
        if !["en_cours", "complet", "incomplet"].contains(&etat.as_str()) {
            return Err(ApiError::validation(
                "etatDossier must be en_cours, complet or incomplet",
            ));
        }
    }
    Ok(())
}

async fn list_students(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let students = state.storage.database.list_students().await?;
    let data: Vec<StudentView> = students.into_iter().map(StudentView::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

async fn by_promotion(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    session.require_teacher()?;
    let students = state
        .storage
        .database
        .list_students_by_promotion(path.into_inner())
        .await?;
    let data: Vec<StudentView> = students.into_iter().map(StudentView::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

async fn get_student(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let student_id = path.into_inner();
    let db = &state.storage.database;

    let student = db
        .find_student(student_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;
    let promotion = db.find_promotion_with_filiere(student.promotion_id).await?;
    let user = match student.user_id {
        Some(user_id) => db.find_user_by_id(user_id).await?,
        None => None,
    };

    let (promotion, filiere) = match promotion {
        Some((p, f)) => (Some(p), f),
        None => (None, None),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(StudentView::from((
        student, promotion, filiere, user,
    )))))
}

async fn create_student(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<StudentPayload>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let request = request.into_inner();

    if request.nom.trim().is_empty() {
        return Err(ApiError::validation("Name is required"));
    }
    Validator::validate_matricule(&request.matricule)?;
    validate_enums(&request.sexe, &request.etat_dossier)?;
    let date_naissance = parse_birth_date(request.date_naissance.as_deref())?;

    let db = &state.storage.database;
    db.find_promotion(request.promotion_id)
        .await?
        .ok_or_else(|| ApiError::validation("Unknown promotionId"))?;

    if db
        .find_student_by_matricule(request.matricule.trim())
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Matricule already exists"));
    }

    if let Some(user_id) = request.user_id {
        if db.find_student_by_user_id(user_id).await?.is_some() {
            return Err(ApiError::conflict(
                "This user is already linked to another student",
            ));
        }
    }

    let created = db
        .create_student(
            request.matricule.trim().to_string(),
            request.nom,
            request.prenom,
            request.sexe,
            date_naissance,
            request.lieu_naissance,
            request.grade,
            request.etat_dossier,
            request.promotion_id,
            request.user_id,
            request.photo_url,
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(created, "Student created")))
}

async fn update_student(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
    request: web::Json<StudentPayload>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let student_id = path.into_inner();
    let request = request.into_inner();

    if request.nom.trim().is_empty() {
        return Err(ApiError::validation("Name is required"));
    }
    Validator::validate_matricule(&request.matricule)?;
    validate_enums(&request.sexe, &request.etat_dossier)?;
    let date_naissance = parse_birth_date(request.date_naissance.as_deref())?;

    let db = &state.storage.database;
    let existing = db
        .find_student(student_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;

    db.find_promotion(request.promotion_id)
        .await?
        .ok_or_else(|| ApiError::validation("Unknown promotionId"))?;

    if let Some(user_id) = request.user_id {
        if user_id != existing.user_id.unwrap_or_default() {
            if let Some(link) = db.find_student_by_user_id(user_id).await? {
                if link.id != existing.id {
                    return Err(ApiError::conflict(
                        "This user is already linked to another student",
                    ));
                }
            }
        }
    }

    use sea_orm::ActiveValue::Set;
    let changes = student::ActiveModel {
        matricule: Set(request.matricule.trim().to_string()),
        nom: Set(request.nom),
        prenom: Set(request.prenom),
        sexe: Set(request.sexe),
        date_naissance: Set(date_naissance),
        lieu_naissance: Set(request.lieu_naissance),
        grade: Set(request.grade),
        etat_dossier: Set(request
            .etat_dossier
            .unwrap_or_else(|| existing.etat_dossier.clone())),
        promotion_id: Set(request.promotion_id),
        user_id: Set(request.user_id),
        photo_url: Set(request.photo_url.or_else(|| existing.photo_url.clone())),
        ..Default::default()
    };

    let updated = db.update_student(student_id, changes).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(updated, "Student updated")))
}

async fn delete_student(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    state
        .storage
        .database
        .soft_delete_student(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Student deleted")))
}

async fn link_student(
    state: web::Data<AppState>,
    session: AuthSession,
    request: web::Json<LinkPayload>,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let db = &state.storage.database;

    db.find_user_by_id(request.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let linked = db
        .link_student_to_user(request.student_id, request.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(linked, "Link created")))
}

/// Module of the student's promotion with its resources and teacher
#[derive(Debug, Serialize)]
pub struct StudentPromotionModule {
    #[serde(flatten)]
    pub module: module::Model,
    pub teacher: Option<crate::storage::database::entities::teacher::Model>,
    pub resources: Vec<resource::Model>,
}

#[derive(Debug, Serialize)]
pub struct MyModulesResponse {
    pub promotion: promotion::Model,
    pub modules: Vec<StudentPromotionModule>,
}

/// Modules of the caller's own promotion. A student account with no linked
/// profile gets the explicit "not linked" condition, not a 500 and not a
/// silent empty list.
async fn my_modules(state: web::Data<AppState>, session: AuthSession) -> Result<HttpResponse> {
    session.require_student()?;
    let profile = session.require_student_profile()?;
    let db = &state.storage.database;

    let promotion = db
        .find_promotion(profile.promotion_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Promotion not found"))?;

    let modules = db.list_modules_by_promotion(promotion.id).await?;
    let mut data = Vec::with_capacity(modules.len());
    for (m, t, _, _) in modules {
        let resources = db.list_resources_by_module(m.id).await?;
        data.push(StudentPromotionModule {
            module: m,
            teacher: t,
            resources,
        });
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(MyModulesResponse {
        promotion,
        modules: data,
    })))
}

/// Photo upload for student records (admin family)
async fn upload_photo(
    state: web::Data<AppState>,
    session: AuthSession,
    payload: actix_multipart::Multipart,
) -> Result<HttpResponse> {
    session.require_admin_family()?;
    let url = super::uploads::save_photo_from_multipart(&state, payload).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        serde_json::json!({ "url": url }),
        "Upload OK",
    )))
}
