//! Database bootstrap: conventional roles plus an initial admin account
//!
//! Usage: `seed [admin-username] [admin-email] [admin-password]`.
//! Idempotent — existing roles and an existing admin are left alone.

use academix::auth::password::hash_password;
use academix::domain::RoleKind;
use academix::storage::database::NewUser;
use academix::storage::Database;
use academix::{Config, Result};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const ROLE_NAMES: &[&str] = &["admin", "secretary", "de", "teacher", "student"];

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    match seed().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Seed error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn seed() -> Result<()> {
    let config = Config::from_env()?;
    let db = Database::connect(&config.database).await?;
    db.migrate().await?;

    for name in ROLE_NAMES {
        if db.find_role_by_name(name).await?.is_none() {
            db.create_role(name).await?;
            info!("Created role: {}", name);
        }
    }

    let mut args = std::env::args().skip(1);
    let username = args.next().unwrap_or_else(|| "admin".to_string());
    let email = args.next().unwrap_or_else(|| "admin@academix.local".to_string());
    let password = args.next().unwrap_or_else(|| "change-me-now".to_string());

    if db.find_user_by_username(&username).await?.is_some() {
        info!("Admin account already exists: {}", username);
    } else {
        let admin_role = db
            .find_role_by_name(RoleKind::Admin.as_str())
            .await?
            .expect("admin role was just seeded");
        db.create_user(NewUser {
            username: username.clone(),
            email,
            password_hash: hash_password(&password)?,
            phone: None,
            photo_url: None,
            status: "active".to_string(),
            role_id: Some(admin_role.id),
        })
        .await?;
        info!("Created admin account: {}", username);
    }

    let users = db.count_users().await?;
    info!("Seed finished; {} user account(s) in store", users);
    Ok(())
}
