use axum::{Router, http::StatusCode};
use db::models::{attendance_record, class, student};
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;

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

#[tokio::test]
#[serial]
async fn created_session_has_code_pin_and_default_radius() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;

    let s = create_session(&app, &token, json!({ "title": "  Lecture 2  " })).await;
    assert_eq!(s["title"], "Lecture 2");
    assert_eq!(s["active"], true);
    assert_eq!(s["session_code"].as_str().unwrap().len(), 32);
    assert_eq!(s["pin"].as_str().unwrap().len(), 6);
    assert_eq!(s["attendance_count"], 0);
    assert!(s["latitude"].is_null());
}

#[tokio::test]
#[serial]
async fn half_a_location_is_rejected() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;

    let res = app
        .oneshot(json_req(
            "POST",
            "/api/sessions",
            Some(&token),
            None,
            json!({ "title": "Bad", "latitude": 10.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn other_teachers_sessions_are_invisible() {
    let (app, state) = make_test_app().await;
    let (_, owner) = seed_teacher(&state, "owner").await;
    let (_, intruder) = seed_teacher(&state, "intruder").await;
    let s = create_session(&app, &owner, json!({ "title": "Private" })).await;
    let id = s["id"].as_i64().unwrap();

    let res = app
        .clone()
        .oneshot(get(&format!("/api/sessions/{id}"), Some(&intruder)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .clone()
        .oneshot(json_req(
            "PUT",
            &format!("/api/sessions/{id}/status"),
            Some(&intruder),
            None,
            json!({ "active": false }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .oneshot(get("/api/sessions", Some(&intruder)))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
#[serial]
async fn status_and_location_updates_round_trip() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let s = create_session(&app, &token, json!({ "title": "Lab" })).await;
    let id = s["id"].as_i64().unwrap();

    let res = app
        .clone()
        .oneshot(json_req(
            "PUT",
            &format!("/api/sessions/{id}/status"),
            Some(&token),
            None,
            json!({ "active": false }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["data"]["active"], false);

    let res = app
        .clone()
        .oneshot(json_req(
            "PUT",
            &format!("/api/sessions/{id}/location"),
            Some(&token),
            None,
            json!({ "latitude": 24.7, "longitude": 46.6, "radius_m": 250 }),
        ))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body["data"]["latitude"], 24.7);
    assert_eq!(body["data"]["radius_m"], 250);

    let res = app
        .clone()
        .oneshot(json_req(
            "PUT",
            &format!("/api/sessions/{id}/location"),
            Some(&token),
            None,
            json!({ "latitude": 91.0, "longitude": 0.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .oneshot(json_req(
            "DELETE",
            &format!("/api/sessions/{id}/location"),
            Some(&token),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_json(res).await["data"]["latitude"].is_null());
}

#[tokio::test]
#[serial]
async fn deleting_a_session_removes_its_records() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let s = create_session(&app, &token, json!({ "title": "Gone" })).await;
    let id = s["id"].as_i64().unwrap();

    attendance_record::Model::insert(
        state.db(),
        attendance_record::NewRecord {
            session_id: id,
            student_name: "Ann".into(),
            student_id: "S1".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let res = app
        .clone()
        .oneshot(json_req("DELETE", &format!("/api/sessions/{id}"), Some(&token), None, json!({})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(get(&format!("/api/sessions/{id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        attendance_record::Model::count_for_session(state.db(), id).await.unwrap(),
        0
    );
}

#[tokio::test]
#[serial]
async fn allowed_list_crud() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let s = create_session(&app, &token, json!({ "title": "Seminar" })).await;
    let id = s["id"].as_i64().unwrap();
    let base = format!("/api/sessions/{id}/allowed-students");

    let res = app
        .clone()
        .oneshot(json_req("POST", &base, Some(&token), None, json!({ "student_id": "S1" })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .clone()
        .oneshot(json_req("POST", &base, Some(&token), None, json!({ "student_id": "S1" })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(json_req(
            "POST",
            &format!("{base}/bulk"),
            Some(&token),
            None,
            json!({ "students": [
                { "student_id": "S1" },
                { "student_id": "S2", "student_name": "Bob" },
                { "student_id": "" }
            ] }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["data"].as_array().unwrap().len(), 2);

    let res = app
        .clone()
        .oneshot(json_req("DELETE", &format!("{base}/S2"), Some(&token), None, json!({})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_req("DELETE", &format!("{base}/S2"), Some(&token), None, json!({})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.oneshot(get(&base, Some(&token))).await.unwrap();
    assert_eq!(body_json(res).await["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn manual_override_marks_and_unmarks_roster_students() {
    let (app, state) = make_test_app().await;
    let (teacher, token) = seed_teacher(&state, "t1").await;
    let class = class::Model::create(state.db(), teacher.id, "CS101", None)
        .await
        .unwrap();
    student::Model::create(state.db(), class.id, "S1", "Ann", Some("ann@example.com".into()))
        .await
        .unwrap();
    student::Model::create(state.db(), class.id, "S2", "Bob", None)
        .await
        .unwrap();
    let s = create_session(
        &app,
        &token,
        json!({ "title": "Week 1", "class_id": class.id, "active": false }),
    )
    .await;
    let id = s["id"].as_i64().unwrap();

    let res = app
        .clone()
        .oneshot(json_req(
            "PUT",
            &format!("/api/sessions/{id}/attendance/S1"),
            Some(&token),
            None,
            json!({ "present": true }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["data"]["changed"], true);
    assert_eq!(body["data"]["record"]["student_name"], "Ann");

    let res = app
        .clone()
        .oneshot(json_req(
            "PUT",
            &format!("/api/sessions/{id}/attendance/S1"),
            Some(&token),
            None,
            json!({ "present": true }),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["data"]["changed"], false);

    let res = app
        .clone()
        .oneshot(json_req(
            "PUT",
            &format!("/api/sessions/{id}/attendance/S404"),
            Some(&token),
            None,
            json!({ "present": true }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .clone()
        .oneshot(get(&format!("/api/sessions/{id}/attendance"), Some(&token)))
        .await
        .unwrap();
    let view = body_json(res).await["data"].clone();
    assert_eq!(view["mode"], "roster");
    assert_eq!(view["summary"]["present"], 1);
    assert_eq!(view["summary"]["absent"], 1);
    assert_eq!(view["summary"]["percentage"], 50);

    let res = app
        .clone()
        .oneshot(json_req(
            "PUT",
            &format!("/api/sessions/{id}/attendance/S1"),
            Some(&token),
            None,
            json!({ "present": false }),
        ))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body["data"]["changed"], true);
    assert_eq!(body["data"]["attendance_count"], 0);
}

#[tokio::test]
#[serial]
async fn unlinked_session_attendance_lists_records() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let s = create_session(&app, &token, json!({ "title": "Drop-in" })).await;
    let id = s["id"].as_i64().unwrap();

    app.clone()
        .oneshot(json_req(
            "PUT",
            &format!("/api/sessions/{id}/attendance/S7"),
            Some(&token),
            None,
            json!({ "present": true, "student_name": "Walk-in" }),
        ))
        .await
        .unwrap();

    let res = app
        .oneshot(get(&format!("/api/sessions/{id}/attendance"), Some(&token)))
        .await
        .unwrap();
    let view = body_json(res).await["data"].clone();
    assert_eq!(view["mode"], "records");
    assert_eq!(view["records"][0]["student_name"], "Walk-in");
}

#[tokio::test]
#[serial]
async fn roster_view_keeps_check_ins_of_removed_students() {
    let (app, state) = make_test_app().await;
    let (teacher, token) = seed_teacher(&state, "t1").await;
    let class = class::Model::create(state.db(), teacher.id, "CS101", None)
        .await
        .unwrap();
    student::Model::create(state.db(), class.id, "S1", "Ann", None)
        .await
        .unwrap();
    let dropped = student::Model::create(state.db(), class.id, "S2", "Bob", None)
        .await
        .unwrap();
    let s = create_session(&app, &token, json!({ "title": "Week 1", "class_id": class.id })).await;
    let id = s["id"].as_i64().unwrap();

    app.clone()
        .oneshot(json_req(
            "PUT",
            &format!("/api/sessions/{id}/attendance/S2"),
            Some(&token),
            None,
            json!({ "present": true }),
        ))
        .await
        .unwrap();
    let res = app
        .clone()
        .oneshot(json_req(
            "DELETE",
            &format!("/api/classes/{}/students/{}", class.id, dropped.id),
            Some(&token),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(get(&format!("/api/sessions/{id}/attendance"), Some(&token)))
        .await
        .unwrap();
    let view = body_json(res).await["data"].clone();
    assert_eq!(view["students"].as_array().unwrap().len(), 1);
    assert_eq!(view["unlisted"][0]["student_id"], "S2");
    assert_eq!(view["summary"]["total"], 1);
    assert_eq!(view["summary"]["present"], 0);
    assert_eq!(view["summary"]["unlisted"], 1);
}
