use axum::http::StatusCode;
use db::models::attendance_session::{self, NewSession};
use futures::StreamExt;
use serde_json::{Value, json};
use serial_test::serial;
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error, Message};
use tower::ServiceExt;

use crate::helpers::{connect_ws, json as json_req, make_test_app, seed_teacher, spawn_server};

async fn next_event<S>(ws: &mut S) -> Value
where
    S: StreamExt<Item = Result<Message, Error>> + Unpin,
{
    loop {
        let msg = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream closed")
            .expect("ws error");
        if let Message::Text(txt) = msg {
            return serde_json::from_str(&txt).unwrap();
        }
    }
}

#[tokio::test]
#[serial]
async fn dashboard_receives_check_ins_live() {
    let (app, state) = make_test_app().await;
    let (teacher, token) = seed_teacher(&state, "t1").await;
    let session = attendance_session::Model::create(
        state.db(),
        NewSession {
            teacher_id: teacher.id,
            title: "Live".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let addr = spawn_server(app.clone()).await;
    let mut ws = connect_ws(addr, &format!("attendance/sessions/{}", session.id), &token)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let res = app
        .oneshot(json_req(
            "POST",
            "/api/attendance/check-in",
            None,
            Some("198.51.100.4"),
            json!({
                "session_code": session.session_code,
                "student_name": "Ann",
                "student_id": "S1"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["event"], "attendance.marked");
    assert_eq!(event["topic"], format!("attendance:session:{}", session.id));
    assert_eq!(event["payload"]["student_id"], "S1");
    assert_eq!(event["payload"]["count"], 1);
    assert_eq!(event["payload"]["method"], "check_in");

    let topic = format!("attendance:session:{}", session.id);
    assert_eq!(state.ws().subscriber_count(&topic).await, 1);
    ws.close(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(state.ws().subscriber_count(&topic).await, 0);
}

#[tokio::test]
#[serial]
async fn only_the_owner_can_subscribe() {
    let (app, state) = make_test_app().await;
    let (owner, _) = seed_teacher(&state, "owner").await;
    let (_, intruder) = seed_teacher(&state, "intruder").await;
    let session = attendance_session::Model::create(
        state.db(),
        NewSession {
            teacher_id: owner.id,
            title: "Private".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let addr = spawn_server(app).await;
    let path = format!("attendance/sessions/{}", session.id);

    match connect_ws(addr, &path, &intruder).await {
        Err(Error::Http(resp)) => assert_eq!(resp.status(), StatusCode::NOT_FOUND),
        other => panic!("expected 404 handshake failure, got {:?}", other.map(|_| ())),
    }
    match connect_ws(addr, &path, "garbage").await {
        Err(Error::Http(resp)) => assert_eq!(resp.status(), StatusCode::UNAUTHORIZED),
        other => panic!("expected 401 handshake failure, got {:?}", other.map(|_| ())),
    }
}
