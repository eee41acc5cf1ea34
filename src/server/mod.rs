//! HTTP server assembly

pub mod middleware;
pub mod routes;
pub mod state;

use crate::auth::AuthSystem;
use crate::config::Config;
use crate::storage::StorageLayer;
use crate::utils::error::{ApiError, Result};
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use state::AppState;
use tracing::info;
use tracing_actix_web::TracingLogger;

fn build_cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);
    for origin in origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

/// Connect storage, build the shared state and serve until shutdown
pub async fn run(config: Config) -> Result<()> {
    let storage = StorageLayer::new(&config).await?;
    let auth = AuthSystem::new(&config.auth)?;

    let bind_addr = (config.server.host.clone(), config.server.port);
    let state = web::Data::new(AppState::new(config, auth, storage));

    info!("Listening on {}:{}", bind_addr.0, bind_addr.1);
    HttpServer::new(move || {
        let cors = build_cors(&state.config.server.cors_origins);
        App::new()
            .app_data(state.clone())
            .wrap(middleware::AuditLogger)
            .wrap(cors)
            .wrap(TracingLogger::default())
            .service(actix_files::Files::new(
                "/uploads",
                state.storage.files.root(),
            ))
            .configure(routes::configure)
    })
    .bind(bind_addr)
    .map_err(ApiError::Io)?
    .run()
    .await
    .map_err(ApiError::Io)
}
