//! Common test utilities
//!
//! Spin up the full application state over an in-memory SQLite database,
//! with fixtures for the entities most tests need.

pub mod fixtures;

use academix::auth::AuthSystem;
use academix::config::{AuthConfig, Config, DatabaseConfig, ServerConfig, UploadConfig};
use academix::server::routes;
use academix::server::state::AppState;
use academix::storage::{Database, FileStore, StorageLayer};
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use sea_orm::ConnectOptions;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Full application state over a fresh in-memory database
pub struct TestCtx {
    pub state: web::Data<AppState>,
    // Holds the upload directory alive for the test's duration
    _upload_dir: tempfile::TempDir,
}

impl TestCtx {
    pub async fn new() -> Self {
        // A single connection keeps every query on the same in-memory
        // database; a pool would silently hand out blank databases.
        let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
        opt.max_connections(1).sqlx_logging(false);
        let conn = sea_orm::Database::connect(opt)
            .await
            .expect("in-memory sqlite");

        let database = Database::from_connection(conn);
        database.migrate().await.expect("migrations");

        let upload_dir = tempfile::tempdir().expect("upload dir");
        let upload_config = UploadConfig {
            root_dir: upload_dir.path().to_string_lossy().into_owned(),
            max_photo_bytes: 1024 * 1024,
        };
        let files = FileStore::new(&upload_config).expect("file store");

        let auth_config = AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            token_lifetime: 3600,
        };
        let config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: auth_config.clone(),
            uploads: upload_config,
        };

        let auth = AuthSystem::new(&auth_config).expect("auth system");
        let storage = StorageLayer { database, files };
        let state = web::Data::new(AppState::new(config, auth, storage));

        Self {
            state,
            _upload_dir: upload_dir,
        }
    }

    pub fn db(&self) -> &Database {
        &self.state.storage.database
    }

    /// Issue a session token exactly as login would
    pub fn token_for(&self, user: &academix::storage::database::entities::user::Model, role: &str) -> String {
        self.state
            .auth
            .jwt()
            .issue(user.id, Some(role))
            .expect("token")
    }
}

/// The application under test, with the production route table
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).configure(routes::configure)
}

/// Convenience: `Authorization` header tuple for a bearer token
pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
