mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use db::models::{class_section, course, enrollment, user::Role};
use helpers::{auth_header, make_test_app, seed_user};

struct Scenario {
    app: Router,
    db: DatabaseConnection,
    teacher: db::models::user::Model,
    student: db::models::user::Model,
    section: class_section::Model,
}

async fn scenario() -> Scenario {
    let (app, db) = make_test_app().await;
    let teacher = seed_user(&db, "msmith", "Mary Smith", Role::Teacher).await;
    let student = seed_user(&db, "jdoe", "John Doe", Role::Student).await;
    let course = course::Model::create(&db, "CS101", "Intro to CS", None)
        .await
        .expect("course");
    let section = class_section::Model::create(
        &db,
        course.id,
        teacher.id,
        "Section A",
        None,
        Some("Room 12"),
        "JOIN01",
    )
    .await
    .expect("section");
    enrollment::Model::enroll(&db, student.id, section.id)
        .await
        .expect("enroll");
    Scenario {
        app,
        db,
        teacher,
        student,
        section,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_req(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method("GET");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

fn session_body(class_section_id: i64) -> Value {
    json!({
        "class_section_id": class_section_id,
        "duration_minutes": 60,
        "latitude": -25.7545,
        "longitude": 28.2314,
    })
}

async fn open_session(s: &Scenario) -> Value {
    let auth = auth_header(&s.teacher);
    let (status, body) = send(
        &s.app,
        post_json(
            "/api/attendance/sessions",
            Some(&auth),
            session_body(s.section.id),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].clone()
}

#[tokio::test]
async fn create_session_requires_auth() {
    let s = scenario().await;
    let (status, _) = send(
        &s.app,
        post_json("/api/attendance/sessions", None, session_body(s.section.id)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn student_cannot_create_session() {
    let s = scenario().await;
    let auth = auth_header(&s.student);
    let (status, body) = send(
        &s.app,
        post_json(
            "/api/attendance/sessions",
            Some(&auth),
            session_body(s.section.id),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn other_teacher_cannot_create_session() {
    let s = scenario().await;
    let other = seed_user(&s.db, "other", "Other Teacher", Role::Teacher).await;
    let auth = auth_header(&other);
    let (status, _) = send(
        &s.app,
        post_json(
            "/api/attendance/sessions",
            Some(&auth),
            session_body(s.section.id),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_create_session_for_any_class() {
    let s = scenario().await;
    let admin = seed_user(&s.db, "root", "Site Admin", Role::Admin).await;
    let auth = auth_header(&admin);
    let (status, body) = send(
        &s.app,
        post_json(
            "/api/attendance/sessions",
            Some(&auth),
            session_body(s.section.id),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["class_section_id"], json!(s.section.id));
}

#[tokio::test]
async fn teacher_creates_session_with_code_and_window() {
    let s = scenario().await;
    let data = open_session(&s).await;

    let code = data["code"].as_str().expect("code");
    assert_eq!(code.len(), 8);
    assert!(code
        .chars()
        .all(|c| "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".contains(c)));

    let start: DateTime<Utc> = data["start_time"].as_str().unwrap().parse().unwrap();
    let end: DateTime<Utc> = data["end_time"].as_str().unwrap().parse().unwrap();
    assert_eq!((end - start).num_minutes(), 60);
}

#[tokio::test]
async fn create_session_rejects_bad_duration() {
    let s = scenario().await;
    let auth = auth_header(&s.teacher);
    let (status, _) = send(
        &s.app,
        post_json(
            "/api/attendance/sessions",
            Some(&auth),
            json!({
                "class_section_id": s.section.id,
                "duration_minutes": 0,
                "latitude": 0.0,
                "longitude": 0.0,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_session_unknown_class_is_404() {
    let s = scenario().await;
    let auth = auth_header(&s.teacher);
    let (status, _) = send(
        &s.app,
        post_json("/api/attendance/sessions", Some(&auth), session_body(9999)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn student_checks_in_at_target_location() {
    let s = scenario().await;
    let session = open_session(&s).await;
    let auth = auth_header(&s.student);

    let (status, body) = send(
        &s.app,
        post_json(
            "/api/attendance/check-in",
            Some(&auth),
            json!({
                "code": session["code"],
                "latitude": -25.7545,
                "longitude": 28.2314,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Check-in success"));
    assert_eq!(body["data"]["distance_m"], json!(0.0));
}

#[tokio::test]
async fn duplicate_check_in_is_rejected() {
    let s = scenario().await;
    let session = open_session(&s).await;
    let auth = auth_header(&s.student);
    let body = json!({
        "code": session["code"],
        "latitude": -25.7545,
        "longitude": 28.2314,
    });

    let (first, _) = send(
        &s.app,
        post_json("/api/attendance/check-in", Some(&auth), body.clone()),
    )
    .await;
    assert_eq!(first, StatusCode::OK);

    let (second, resp) = send(
        &s.app,
        post_json("/api/attendance/check-in", Some(&auth), body),
    )
    .await;
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(resp["message"], json!("You have already checked in"));
}

#[tokio::test]
async fn check_in_with_unknown_code_is_rejected() {
    let s = scenario().await;
    let auth = auth_header(&s.student);
    let (status, _) = send(
        &s.app,
        post_json(
            "/api/attendance/check-in",
            Some(&auth),
            json!({ "code": "NOPE1234", "latitude": 0.0, "longitude": 0.0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unenrolled_student_cannot_check_in() {
    let s = scenario().await;
    let session = open_session(&s).await;
    let outsider = seed_user(&s.db, "outsider", "Out Sider", Role::Student).await;
    let auth = auth_header(&outsider);

    let (status, body) = send(
        &s.app,
        post_json(
            "/api/attendance/check-in",
            Some(&auth),
            json!({
                "code": session["code"],
                "latitude": -25.7545,
                "longitude": 28.2314,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("You are not in this class"));
}

#[tokio::test]
async fn teacher_cannot_check_in() {
    let s = scenario().await;
    let session = open_session(&s).await;
    let auth = auth_header(&s.teacher);

    let (status, _) = send(
        &s.app,
        post_json(
            "/api/attendance/check-in",
            Some(&auth),
            json!({
                "code": session["code"],
                "latitude": -25.7545,
                "longitude": 28.2314,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn teacher_views_session_roster() {
    let s = scenario().await;
    let session = open_session(&s).await;
    let student_auth = auth_header(&s.student);
    let (status, _) = send(
        &s.app,
        post_json(
            "/api/attendance/check-in",
            Some(&student_auth),
            json!({
                "code": session["code"],
                "latitude": -25.7545,
                "longitude": 28.2314,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let auth = auth_header(&s.teacher);
    let uri = format!("/api/attendance/sessions/{}/records", session["id"]);
    let (status, body) = send(&s.app, get_req(&uri, Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_checked"], json!(1));
    let row = &body["data"]["records"][0];
    assert_eq!(row["username"], json!("jdoe"));
    assert_eq!(row["full_name"], json!("John Doe"));
    assert_eq!(row["distance_m"], json!(0.0));
}

#[tokio::test]
async fn student_cannot_view_roster() {
    let s = scenario().await;
    let session = open_session(&s).await;
    let auth = auth_header(&s.student);
    let uri = format!("/api/attendance/sessions/{}/records", session["id"]);
    let (status, _) = send(&s.app, get_req(&uri, Some(&auth))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn roster_for_unknown_session_is_404() {
    let s = scenario().await;
    let auth = auth_header(&s.teacher);
    let (status, _) = send(
        &s.app,
        get_req("/api/attendance/sessions/424242/records", Some(&auth)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn student_sees_own_history() {
    let s = scenario().await;
    let session = open_session(&s).await;
    let auth = auth_header(&s.student);
    let (status, _) = send(
        &s.app,
        post_json(
            "/api/attendance/check-in",
            Some(&auth),
            json!({
                "code": session["code"],
                "latitude": -25.7545,
                "longitude": 28.2314,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&s.app, get_req("/api/attendance/my", Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["class_name"], json!("Section A"));
    assert_eq!(rows[0]["course_name"], json!("Intro to CS"));
    assert_eq!(rows[0]["code"], session["code"]);
}

#[tokio::test]
async fn teacher_has_no_attendance_history() {
    let s = scenario().await;
    let auth = auth_header(&s.teacher);
    let (status, _) = send(&s.app, get_req("/api/attendance/my", Some(&auth))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn validate_code_reports_caller_state() {
    let s = scenario().await;
    let session = open_session(&s).await;
    let auth = auth_header(&s.student);

    let uri = format!(
        "/api/attendance/sessions/validate?code={}",
        session["code"].as_str().unwrap()
    );
    let (status, body) = send(&s.app, get_req(&uri, Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active"], json!(true));
    assert_eq!(body["data"]["has_any_checkin"], json!(false));
    assert_eq!(body["data"]["enrolled"], json!(true));
    assert_eq!(body["data"]["already_checked_in"], json!(false));
}

#[tokio::test]
async fn validate_unknown_code_is_404() {
    let s = scenario().await;
    let auth = auth_header(&s.student);
    let (status, _) = send(
        &s.app,
        get_req("/api/attendance/sessions/validate?code=ZZZZZZZZ", Some(&auth)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
