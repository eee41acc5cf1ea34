//! Grading behavior through the API: score computation and CSV import

use crate::common::{bearer, build_app, fixtures, TestCtx};
use actix_web::{http::StatusCode, test};
use serde_json::json;

#[tokio::test]
async fn test_note_score_is_computed_server_side() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let db = ctx.db();

    let admin = fixtures::create_user(db, "admin1", "admin", "secret123").await;
    let promotion = fixtures::create_promotion(db, "P1", 2025).await;
    let student = fixtures::create_student_profile(db, "ETU-1", promotion.id, None).await;
    let module = fixtures::create_module(db, "ALG-1", None, Some(promotion.id)).await;

    let token = ctx.token_for(&admin, "admin");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/notes")
        .insert_header(bearer(&token))
        .set_json(json!({
            "studentId": student.id,
            "moduleId": module.id,
            "ce": 10.0,
            "fe": 15.0,
            "semester": 1
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    // ce*0.4 + fe*0.6
    assert_eq!(body["data"]["score"], json!(13.0));
}

#[tokio::test]
async fn test_note_marks_out_of_range_rejected() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let db = ctx.db();

    let admin = fixtures::create_user(db, "admin1", "admin", "secret123").await;
    let promotion = fixtures::create_promotion(db, "P1", 2025).await;
    let student = fixtures::create_student_profile(db, "ETU-1", promotion.id, None).await;
    let module = fixtures::create_module(db, "ALG-1", None, Some(promotion.id)).await;

    let token = ctx.token_for(&admin, "admin");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/notes")
        .insert_header(bearer(&token))
        .set_json(json!({
            "studentId": student.id,
            "moduleId": module.id,
            "ce": 25.0,
            "fe": 10.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_csv_import_creates_notes_and_reports_failures() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let db = ctx.db();

    let teacher = fixtures::create_user(db, "prof", "teacher", "secret123").await;
    let profile = fixtures::create_teacher_profile(db, &teacher).await;
    let promotion = fixtures::create_promotion(db, "P1", 2025).await;
    fixtures::create_student_profile(db, "ETU-1", promotion.id, None).await;
    fixtures::create_student_profile(db, "ETU-2", promotion.id, None).await;
    let module =
        fixtures::create_module(db, "CSV-1", Some(profile.id), Some(promotion.id)).await;

    let token = ctx.token_for(&teacher, "teacher");
    let app = test::init_service(build_app(ctx.state.clone())).await;

    let csv = "matricule,ce,fe,session,semester,appreciation\n\
               ETU-1,12,14,Normale,1,bien\n\
               ETU-2,8,11,Normale,1,\n\
               GHOST-9,10,10,Normale,1,\n";
    let boundary = "----academix-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"notes.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = boundary,
        csv = csv
    );

    let req = test::TestRequest::post()
        .uri(&format!("/api/notes/module/{}/import", module.id))
        .insert_header(bearer(&token))
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["imported"], json!(2));
    let failed = body["data"]["failed"].as_array().expect("failures");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["matricule"], "GHOST-9");

    let notes = db.list_notes_by_module(module.id).await.expect("notes");
    assert_eq!(notes.len(), 2);
}

#[tokio::test]
async fn test_dashboard_stats_by_role() {
    let ctx = TestCtx::new().await;
    fixtures::seed_roles(ctx.db()).await;
    let db = ctx.db();

    let admin = fixtures::create_user(db, "admin1", "admin", "secret123").await;
    let promotion = fixtures::create_promotion(db, "P1", 2025).await;
    let stu_user = fixtures::create_user(db, "stu", "student", "secret123").await;
    let stu_profile =
        fixtures::create_student_profile(db, "ETU-1", promotion.id, Some(stu_user.id)).await;
    let module = fixtures::create_module(db, "ALG-1", None, Some(promotion.id)).await;
    db.create_note(stu_profile.id, module.id, Some(10.0), Some(12.0), None, None, None)
        .await
        .expect("note");

    let app = test::init_service(build_app(ctx.state.clone())).await;

    let token = ctx.token_for(&admin, "admin");
    let req = test::TestRequest::get()
        .uri("/api/dashboard/stats")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["students"], json!(1));
    assert_eq!(body["data"]["modules"], json!(1));
    assert_eq!(body["data"]["notes"], json!(1));

    let token = ctx.token_for(&stu_user, "student");
    let req = test::TestRequest::get()
        .uri("/api/dashboard/stats")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["notesForStudent"], json!(1));
    assert_eq!(body["data"]["bulletinsForStudent"], json!(0));
}
