use axum::{Router, http::StatusCode};
use db::models::{attendance_record, attendance_session};
use sea_orm::EntityTrait;
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;

use crate::helpers::{body_json, get, json as json_req, make_test_app, seed_teacher};

async fn post(app: &Router, token: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let res = app
        .clone()
        .oneshot(json_req("POST", uri, Some(token), None, body))
        .await
        .unwrap();
    let status = res.status();
    (status, body_json(res).await)
}

#[tokio::test]
#[serial]
async fn class_crud_and_roster() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;

    let (status, body) = post(&app, &token, "/api/classes", json!({ "name": "CS101" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().unwrap();
    let base = format!("/api/classes/{id}");

    let (status, _) = post(
        &app,
        &token,
        &format!("{base}/students"),
        json!({ "student_id": "S1", "name": "Ann", "email": "ann@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post(
        &app,
        &token,
        &format!("{base}/students"),
        json!({ "student_id": "S1", "name": "Ann again" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = post(
        &app,
        &token,
        &format!("{base}/students/bulk"),
        json!({ "students": [
            { "student_id": "S1", "name": "Dup" },
            { "student_id": "S2", "name": "Bob" },
            { "student_id": "S3", "name": "Cy" }
        ] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let roster = body["data"].as_array().unwrap().clone();
    assert_eq!(roster.len(), 3);
    assert_eq!(roster[0]["name"], "Ann");

    let res = app
        .clone()
        .oneshot(json_req(
            "PUT",
            &base,
            Some(&token),
            None,
            json!({ "name": "CS101 Fall", "description": "Intro" }),
        ))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body["data"]["name"], "CS101 Fall");
    assert_eq!(body["data"]["student_count"], 3);

    let row = roster[2]["id"].as_i64().unwrap();
    let res = app
        .clone()
        .oneshot(json_req(
            "DELETE",
            &format!("{base}/students/{row}"),
            Some(&token),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.oneshot(get("/api/classes", Some(&token))).await.unwrap();
    let list = body_json(res).await;
    assert_eq!(list["data"][0]["student_count"], 2);
}

#[tokio::test]
#[serial]
async fn other_teachers_classes_are_invisible() {
    let (app, state) = make_test_app().await;
    let (_, owner) = seed_teacher(&state, "owner").await;
    let (_, intruder) = seed_teacher(&state, "intruder").await;
    let (_, body) = post(&app, &owner, "/api/classes", json!({ "name": "Mine" })).await;
    let id = body["data"]["id"].as_i64().unwrap();

    for uri in [format!("/api/classes/{id}"), format!("/api/classes/{id}/report")] {
        let res = app.clone().oneshot(get(&uri, Some(&intruder))).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let (status, _) = post(
        &app,
        &intruder,
        "/api/sessions",
        json!({ "title": "Sneaky", "class_id": id }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn report_counts_each_linked_session() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let (_, body) = post(&app, &token, "/api/classes", json!({ "name": "CS101" })).await;
    let class_id = body["data"]["id"].as_i64().unwrap();

    post(
        &app,
        &token,
        &format!("/api/classes/{class_id}/students/bulk"),
        json!({ "students": [
            { "student_id": "A", "name": "Ann" },
            { "student_id": "B", "name": "Bob" },
            { "student_id": "C", "name": "Cy" }
        ] }),
    )
    .await;

    let mut ids = Vec::new();
    for title in ["Week 1", "Week 2"] {
        let (_, s) = post(
            &app,
            &token,
            "/api/sessions",
            json!({ "title": title, "class_id": class_id }),
        )
        .await;
        ids.push(s["data"]["id"].as_i64().unwrap());
    }

    for (session_id, sid) in [(ids[0], "A"), (ids[1], "A"), (ids[0], "B")] {
        attendance_record::Model::insert(
            state.db(),
            attendance_record::NewRecord {
                session_id,
                student_name: sid.into(),
                student_id: sid.into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let res = app
        .oneshot(get(&format!("/api/classes/{class_id}/report"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report = body_json(res).await["data"].clone();

    assert_eq!(report["sessions"].as_array().unwrap().len(), 2);
    let pct: Vec<i64> = report["students"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["percentage"].as_i64().unwrap())
        .collect();
    assert_eq!(pct, vec![100, 50, 0]);
    assert_eq!(report["students"][1]["attendance"][ids[1].to_string()], "absent");
}

#[tokio::test]
#[serial]
async fn deleting_a_class_keeps_its_sessions_unlinked() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "t1").await;
    let (_, body) = post(&app, &token, "/api/classes", json!({ "name": "Temp" })).await;
    let class_id = body["data"]["id"].as_i64().unwrap();
    let (_, s) = post(
        &app,
        &token,
        "/api/sessions",
        json!({ "title": "Linked", "class_id": class_id }),
    )
    .await;
    let session_id = s["data"]["id"].as_i64().unwrap();

    let res = app
        .oneshot(json_req(
            "DELETE",
            &format!("/api/classes/{class_id}"),
            Some(&token),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let session = attendance_session::Entity::find_by_id(session_id)
        .one(state.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.class_id, None);
}
