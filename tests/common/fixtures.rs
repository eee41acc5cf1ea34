//! Data factories shared by the integration tests

use academix::auth::password::hash_password;
use academix::storage::database::entities::{
    module, promotion, role, student, teacher, user,
};
use academix::storage::database::NewUser;
use academix::storage::Database;
use uuid::Uuid;

pub const ROLE_NAMES: &[&str] = &["admin", "secretary", "de", "teacher", "student"];

/// Create the conventional role set; returns them by name order
pub async fn seed_roles(db: &Database) -> Vec<role::Model> {
    let mut roles = Vec::new();
    for name in ROLE_NAMES {
        roles.push(db.create_role(name).await.expect("role"));
    }
    roles
}

pub async fn role_id(db: &Database, name: &str) -> i32 {
    db.find_role_by_name(name)
        .await
        .expect("role lookup")
        .expect("role exists")
        .id
}

/// An active user account with the given role and password
pub async fn create_user(
    db: &Database,
    username: &str,
    role_name: &str,
    password: &str,
) -> user::Model {
    let role_id = role_id(db, role_name).await;
    db.create_user(NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: hash_password(password).expect("hash"),
        phone: None,
        photo_url: None,
        status: "active".to_string(),
        role_id: Some(role_id),
    })
    .await
    .expect("user")
}

pub async fn create_promotion(db: &Database, nom: &str, annee: i32) -> promotion::Model {
    db.create_promotion(nom.to_string(), annee, None)
        .await
        .expect("promotion")
}

/// A teacher profile linked to the given account
pub async fn create_teacher_profile(db: &Database, user: &user::Model) -> teacher::Model {
    db.create_teacher(
        user.username.clone(),
        None,
        None,
        Some("informatique".to_string()),
        Some(user.id),
    )
    .await
    .expect("teacher profile")
}

/// A student profile in the promotion, optionally linked to an account
pub async fn create_student_profile(
    db: &Database,
    matricule: &str,
    promotion_id: i32,
    user_id: Option<Uuid>,
) -> student::Model {
    db.create_student(
        matricule.to_string(),
        format!("Student {}", matricule),
        None,
        None,
        None,
        None,
        None,
        None,
        promotion_id,
        user_id,
        None,
    )
    .await
    .expect("student profile")
}

/// A module owned by the given teacher profile
pub async fn create_module(
    db: &Database,
    code: &str,
    teacher_id: Option<Uuid>,
    promotion_id: Option<i32>,
) -> module::Model {
    db.create_module(
        format!("Module {}", code),
        code.to_string(),
        None,
        4,
        1,
        1.0,
        false,
        teacher_id,
        promotion_id,
        None,
    )
    .await
    .expect("module")
}
