//! Resource scoping: module ownership, self-scoping, link uniqueness

use crate::common::{bearer, build_app, fixtures, TestCtx};
use actix_web::{http::StatusCode, test};
use serde_json::json;

#[tokio::test]
async fn test_my_modules_returns_exactly_owned_modules() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let db = ctx.db();

    let alice = fixtures::create_user(db, "alice", "teacher", "secret123").await;
    let alice_profile = fixtures::create_teacher_profile(db, &alice).await;
    let bob = fixtures::create_user(db, "bob", "teacher", "secret123").await;
    let bob_profile = fixtures::create_teacher_profile(db, &bob).await;

    fixtures::create_module(db, "ALG-1", Some(alice_profile.id), None).await;
    fixtures::create_module(db, "ALG-2", Some(alice_profile.id), None).await;
    fixtures::create_module(db, "NET-1", Some(bob_profile.id), None).await;

    let token = ctx.token_for(&alice, "teacher");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/modules/my")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let modules = body["data"].as_array().expect("array");
    let mut codes: Vec<&str> = modules
        .iter()
        .map(|m| m["code"].as_str().unwrap())
        .collect();
    codes.sort();
    assert_eq!(codes, vec!["ALG-1", "ALG-2"]);
}

#[tokio::test]
async fn test_cross_teacher_note_mutation_is_forbidden() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let db = ctx.db();

    let owner = fixtures::create_user(db, "owner", "teacher", "secret123").await;
    let owner_profile = fixtures::create_teacher_profile(db, &owner).await;
    let intruder = fixtures::create_user(db, "intruder", "teacher", "secret123").await;
    fixtures::create_teacher_profile(db, &intruder).await;

    let promotion = fixtures::create_promotion(db, "P1", 2025).await;
    let student = fixtures::create_student_profile(db, "ETU-1", promotion.id, None).await;
    let module =
        fixtures::create_module(db, "SEC-1", Some(owner_profile.id), Some(promotion.id)).await;
    let note = db
        .create_note(student.id, module.id, Some(12.0), Some(14.0), None, None, None)
        .await
        .expect("note");

    let token = ctx.token_for(&intruder, "teacher");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/notes/module/{}/{}", module.id, note.id))
        .insert_header(bearer(&token))
        .set_json(json!({ "ce": 0.0, "fe": 0.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "NOT_OWNER");

    // The note is unmodified
    let unchanged = db.find_note(note.id).await.expect("find").expect("note");
    assert_eq!(unchanged.ce, Some(12.0));
    assert_eq!(unchanged.fe, Some(14.0));
    assert_eq!(unchanged.score, Some(13.2));
}

#[tokio::test]
async fn test_admin_family_bypasses_module_ownership() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let db = ctx.db();

    let owner = fixtures::create_user(db, "owner", "teacher", "secret123").await;
    let owner_profile = fixtures::create_teacher_profile(db, &owner).await;
    let de = fixtures::create_user(db, "director", "de", "secret123").await;

    let module = fixtures::create_module(db, "HIS-1", Some(owner_profile.id), None).await;

    let token = ctx.token_for(&de, "de");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/notes/module/{}", module.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_module_not_found_precedes_ownership() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let db = ctx.db();

    let teacher = fixtures::create_user(db, "prof", "teacher", "secret123").await;
    fixtures::create_teacher_profile(db, &teacher).await;

    let token = ctx.token_for(&teacher, "teacher");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/notes/module/{}", uuid::Uuid::new_v4()))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unlinked_student_gets_profile_not_linked() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let user = fixtures::create_user(ctx.db(), "fresh", "student", "secret123").await;
    let token = ctx.token_for(&user, "student");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/students/mes-modules")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    // A distinct client error: neither 401/403 nor a 500
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "PROFILE_NOT_LINKED");
}

#[tokio::test]
async fn test_student_sees_only_own_notes() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let db = ctx.db();

    let promotion = fixtures::create_promotion(db, "P1", 2025).await;
    let user_a = fixtures::create_user(db, "stu-a", "student", "secret123").await;
    let profile_a =
        fixtures::create_student_profile(db, "ETU-A", promotion.id, Some(user_a.id)).await;
    let user_b = fixtures::create_user(db, "stu-b", "student", "secret123").await;
    let profile_b =
        fixtures::create_student_profile(db, "ETU-B", promotion.id, Some(user_b.id)).await;

    let module = fixtures::create_module(db, "MAT-1", None, Some(promotion.id)).await;
    db.create_note(profile_a.id, module.id, Some(10.0), Some(10.0), None, None, None)
        .await
        .expect("note a");
    db.create_note(profile_b.id, module.id, Some(18.0), Some(18.0), None, None, None)
        .await
        .expect("note b");

    let token = ctx.token_for(&user_a, "student");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/notes/student/my")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let notes = body["data"].as_array().expect("array");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["studentId"], json!(profile_a.id));
}

#[tokio::test]
async fn test_one_student_cannot_link_to_two_users() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let db = ctx.db();

    let admin = fixtures::create_user(db, "admin1", "admin", "secret123").await;
    let promotion = fixtures::create_promotion(db, "P1", 2025).await;
    let student = fixtures::create_student_profile(db, "ETU-9", promotion.id, None).await;
    let user_a = fixtures::create_user(db, "acct-a", "student", "secret123").await;
    let user_b = fixtures::create_user(db, "acct-b", "student", "secret123").await;

    let token = ctx.token_for(&admin, "admin");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/students/link")
        .insert_header(bearer(&token))
        .set_json(json!({ "studentId": student.id, "userId": user_a.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // A second account cannot claim the same student: one-to-one linking,
    // backed by the unique index
    let other = fixtures::create_student_profile(db, "ETU-10", promotion.id, None).await;
    let req = test::TestRequest::post()
        .uri("/api/students/link")
        .insert_header(bearer(&token))
        .set_json(json!({ "studentId": other.id, "userId": user_a.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // And a fresh account may still claim a free student
    let req = test::TestRequest::post()
        .uri("/api/students/link")
        .insert_header(bearer(&token))
        .set_json(json!({ "studentId": other.id, "userId": user_b.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_teacher_upsert_presence_on_other_module_forbidden() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let db = ctx.db();

    let owner = fixtures::create_user(db, "owner", "teacher", "secret123").await;
    let owner_profile = fixtures::create_teacher_profile(db, &owner).await;
    let intruder = fixtures::create_user(db, "intruder", "teacher", "secret123").await;
    fixtures::create_teacher_profile(db, &intruder).await;

    let promotion = fixtures::create_promotion(db, "P1", 2025).await;
    let student = fixtures::create_student_profile(db, "ETU-2", promotion.id, None).await;
    let module =
        fixtures::create_module(db, "PHY-1", Some(owner_profile.id), Some(promotion.id)).await;

    let token = ctx.token_for(&intruder, "teacher");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/presence")
        .insert_header(bearer(&token))
        .set_json(json!({
            "studentId": student.id,
            "moduleId": module.id,
            "date": "2025-03-10",
            "statut": "present"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
