//! HTTP route modules
//!
//! One module per entity surface, mounted under `/api` by [`configure`].

pub mod auth;
pub mod bulletins;
pub mod dashboard;
pub mod filieres;
pub mod modules;
pub mod notes;
pub mod presences;
pub mod promotions;
pub mod resources;
pub mod roles;
pub mod schedules;
pub mod students;
pub mod teachers;
pub mod uploads;
pub mod users;

use actix_web::{web, HttpResponse};

/// Standard API response structure
#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message, when one adds context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: serde::Serialize,
{
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Create a successful response with a message
    pub fn success_with_message<S: Into<String>>(data: T, message: S) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// A data-less acknowledgement
    pub fn message<S: Into<String>>(message: S) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Mount every API route under `/api`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(web::scope("/auth").configure(auth::configure))
            .service(web::scope("/users").configure(users::configure))
            .service(web::scope("/roles").configure(roles::configure))
            .service(web::scope("/students").configure(students::configure))
            .service(web::scope("/teachers").configure(teachers::configure))
            .service(web::scope("/modules").configure(modules::configure))
            .service(web::scope("/notes").configure(notes::configure))
            .service(web::scope("/promotions").configure(promotions::configure))
            .service(web::scope("/filieres").configure(filieres::configure))
            .service(web::scope("/bulletins").configure(bulletins::configure))
            .service(web::scope("/presence").configure(presences::configure))
            .service(web::scope("/schedules").configure(schedules::configure))
            .service(web::scope("/resources").configure(resources::configure))
            .service(web::scope("/dashboard").configure(dashboard::configure))
            .service(web::scope("/upload-photo").configure(uploads::configure))
            .route("", web::get().to(api_root)),
    );
}

async fn api_root() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::<()>::message("Academic backend up"))
}
