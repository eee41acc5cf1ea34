//! Authentication and role-gate behavior through the full HTTP stack

use crate::common::{bearer, build_app, fixtures, TestCtx};
use actix_web::{http::StatusCode, test};
use serde_json::json;

#[tokio::test]
async fn test_register_login_profile_flow() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "newstudent",
            "email": "NewStudent@Example.com",
            "password": "secret123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    // No matricule was provided, so the link step reports itself untried
    assert_eq!(body["data"]["studentLink"]["status"], "not_attempted");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "newstudent", "password": "secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["data"]["token"].as_str().expect("token").to_string();
    assert_eq!(body["data"]["user"]["role"]["name"], "student");

    let req = test::TestRequest::get()
        .uri("/api/auth/profile")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["username"], "newstudent");
    // The password hash must never serialize
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert!(body["data"]["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_401() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    fixtures::create_user(ctx.db(), "victim", "teacher", "right-password").await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "victim", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Unknown accounts answer identically
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "nobody", "password": "whatever" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_inactive_account_cannot_login() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let user = fixtures::create_user(ctx.db(), "pending", "student", "secret123").await;
    ctx.db()
        .set_user_status(user.id, "inactive")
        .await
        .expect("status");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "pending", "password": "secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_garbage_bearer_token_is_401_everywhere() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    for uri in [
        "/api/users",
        "/api/modules",
        "/api/notes",
        "/api/dashboard/stats",
        "/api/auth/profile",
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(("Authorization", "Bearer garbage"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_missing_token_is_401() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_student_cannot_create_roles() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let user = fixtures::create_user(ctx.db(), "student1", "student", "secret123").await;
    let token = ctx.token_for(&user, "student");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/roles")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "superuser" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // No row was created
    assert!(ctx
        .db()
        .find_role_by_name("superuser")
        .await
        .expect("lookup")
        .is_none());
}

#[tokio::test]
async fn test_stale_token_for_deleted_user_is_401() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let user = fixtures::create_user(ctx.db(), "ghost", "admin", "secret123").await;
    let token = ctx.token_for(&user, "admin");
    ctx.db().soft_delete_user(user.id).await.expect("delete");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_secretary_passes_admin_family_but_not_admin_gate() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let user = fixtures::create_user(ctx.db(), "sec", "secretary", "secret123").await;
    let token = ctx.token_for(&user, "secretary");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    // Admin-family route
    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Admin-only route
    let req = test::TestRequest::post()
        .uri("/api/roles")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "helper" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_links_student_by_matricule() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let promotion = fixtures::create_promotion(ctx.db(), "P1", 2025).await;
    let student =
        fixtures::create_student_profile(ctx.db(), "ETU-777", promotion.id, None).await;
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "matched",
            "email": "matched@example.com",
            "password": "secret123",
            "matricule": "ETU-777"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["studentLink"]["status"], "linked");

    let linked = ctx
        .db()
        .find_student(student.id)
        .await
        .expect("lookup")
        .expect("student");
    assert!(linked.user_id.is_some());
}
