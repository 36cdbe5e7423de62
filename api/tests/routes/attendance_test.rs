use axum::{Router, http::StatusCode};
use db::models::{allowed_student, class, student};
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;
use util::config::AppConfig;

use crate::helpers::{body_json, get, json as json_req, make_test_app, seed_teacher};

async fn create_session(app: &Router, token: &str, body: Value) -> Value {
    let res = app
        .clone()
        .oneshot(json_req("POST", "/api/sessions", Some(token), None, body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    body_json(res).await["data"].clone()
}

async fn check_in(app: &Router, ip: &str, body: Value) -> (StatusCode, Value) {
    let res = app
        .clone()
        .oneshot(json_req("POST", "/api/attendance/check-in", None, Some(ip), body))
        .await
        .unwrap();
    let status = res.status();
    (status, body_json(res).await)
}

#[tokio::test]
#[serial]
async fn open_session_accepts_one_check_in_per_student_and_device() {
    AppConfig::set_enforce_device_check(true);
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let session = create_session(&app, &token, json!({ "title": "Lecture 1" })).await;
    let code = session["session_code"].as_str().unwrap();

    let (status, body) = check_in(
        &app,
        "203.0.113.1",
        json!({ "session_code": code, "student_name": "Ann Lee", "student_id": "S1" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["session_title"], "Lecture 1");
    assert!(body["data"].get("reason").is_none());

    let (status, _) = check_in(
        &app,
        "203.0.113.2",
        json!({ "session_code": code, "student_name": "Someone", "student_id": "S1" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = check_in(
        &app,
        "203.0.113.3",
        json!({ "session_code": code, "student_name": "ann lee", "student_id": "S9" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = check_in(
        &app,
        "203.0.113.1",
        json!({ "session_code": code, "student_name": "Bob", "student_id": "S2" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Attendance already recorded from this device");

    AppConfig::reset();
}

#[tokio::test]
#[serial]
async fn device_rule_can_be_switched_off() {
    AppConfig::set_enforce_device_check(false);
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let session = create_session(&app, &token, json!({ "title": "Lab" })).await;
    let code = session["session_code"].as_str().unwrap();

    for (name, id) in [("Ann", "S1"), ("Bob", "S2")] {
        let (status, _) = check_in(
            &app,
            "10.0.0.8",
            json!({ "session_code": code, "student_name": name, "student_id": id }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    AppConfig::reset();
}

#[tokio::test]
#[serial]
async fn unknown_and_closed_sessions_are_rejected() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;

    let (status, _) = check_in(
        &app,
        "10.0.0.1",
        json!({ "session_code": "deadbeef", "student_name": "Ann", "student_id": "S1" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let session = create_session(&app, &token, json!({ "title": "Closed", "active": false })).await;
    let code = session["session_code"].as_str().unwrap();

    let res = app
        .clone()
        .oneshot(get(&format!("/api/attendance/verify/{code}"), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let (status, body) = check_in(
        &app,
        "10.0.0.1",
        json!({ "session_code": code, "student_name": "Ann", "student_id": "S1" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Session is closed");
}

#[tokio::test]
#[serial]
async fn pin_lookup_ignores_separators() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let session = create_session(&app, &token, json!({ "title": "Quiz" })).await;
    let pin = session["pin"].as_str().unwrap();
    let spaced = format!("{}-{}", &pin[..3], &pin[3..]);

    let res = app
        .clone()
        .oneshot(get(&format!("/api/attendance/pin/{spaced}"), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["session_code"], session["session_code"]);
    assert_eq!(body["data"]["requires_location"], false);

    let res = app
        .oneshot(get("/api/attendance/pin/000000", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn geofenced_session_checks_distance() {
    AppConfig::set_enforce_device_check(false);
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let session = create_session(
        &app,
        &token,
        json!({ "title": "Field trip", "latitude": 24.7136, "longitude": 46.6753, "radius_m": 100 }),
    )
    .await;
    let code = session["session_code"].as_str().unwrap();

    let (status, _) = check_in(
        &app,
        "10.0.0.1",
        json!({ "session_code": code, "student_name": "Ann", "student_id": "S1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = check_in(
        &app,
        "10.0.0.1",
        json!({
            "session_code": code, "student_name": "Ann", "student_id": "S1",
            "latitude": 24.7208, "longitude": 46.6753
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().contains("allowed radius is 100 m"));
    assert_eq!(body["data"]["reason"], "out_of_range");
    assert_eq!(body["data"]["radius_m"], 100);
    let distance = body["data"]["distance_m"].as_f64().unwrap();
    assert!((790.0..=810.0).contains(&distance));

    let (status, _) = check_in(
        &app,
        "10.0.0.1",
        json!({
            "session_code": code, "student_name": "Ann", "student_id": "S1",
            "latitude": 24.7137, "longitude": 46.6754
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    AppConfig::reset();
}

#[tokio::test]
#[serial]
async fn linked_session_only_admits_roster_students() {
    let (app, state) = make_test_app().await;
    let (teacher, token) = seed_teacher(&state, "t1").await;
    let class = class::Model::create(state.db(), teacher.id, "CS101", None)
        .await
        .unwrap();
    student::Model::create(state.db(), class.id, "S1", "Ann", None)
        .await
        .unwrap();

    let session = create_session(&app, &token, json!({ "title": "Week 1", "class_id": class.id })).await;
    let code = session["session_code"].as_str().unwrap();

    let (status, body) = check_in(
        &app,
        "10.0.0.1",
        json!({ "session_code": code, "student_name": "Eve", "student_id": "S404" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Student is not enrolled in this class");

    let (status, _) = check_in(
        &app,
        "10.0.0.2",
        json!({ "session_code": code, "student_name": "Ann", "student_id": "S1" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[serial]
async fn whitelist_limits_unlinked_session() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let session = create_session(&app, &token, json!({ "title": "Seminar" })).await;
    let code = session["session_code"].as_str().unwrap();
    let id = session["id"].as_i64().unwrap();

    allowed_student::Model::add(state.db(), id, "S1", Some("Ann".into()))
        .await
        .unwrap();

    let (status, _) = check_in(
        &app,
        "10.0.0.1",
        json!({ "session_code": code, "student_name": "Bob", "student_id": "S2" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = check_in(
        &app,
        "10.0.0.2",
        json!({ "session_code": code, "student_name": "Ann", "student_id": "S1" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[serial]
async fn blank_fields_are_bad_request() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let session = create_session(&app, &token, json!({ "title": "Lecture" })).await;
    let code = session["session_code"].as_str().unwrap();

    let (status, _) = check_in(
        &app,
        "10.0.0.1",
        json!({ "session_code": code, "student_name": "   ", "student_id": "S1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
