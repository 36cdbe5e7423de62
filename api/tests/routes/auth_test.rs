use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;
use tower::ServiceExt;

use crate::helpers::{body_json, get, json as json_req, make_test_app, seed_teacher};

#[tokio::test]
#[serial]
async fn register_then_login_issues_working_tokens() {
    let (app, _) = make_test_app().await;

    let res = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/api/auth/register",
            None,
            None,
            json!({ "username": "msmith", "name": "Mary Smith", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await;
    assert_eq!(body["data"]["username"], "msmith");
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));

    let res = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/api/auth/login",
            None,
            None,
            json!({ "username": "msmith", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let token = body_json(res).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_owned();

    let res = app.oneshot(get("/api/auth/me", Some(&token))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me = body_json(res).await;
    assert_eq!(me["data"]["name"], "Mary Smith");
    assert!(me["data"].get("password_hash").is_none());
}

#[tokio::test]
#[serial]
async fn duplicate_username_is_conflict() {
    let (app, state) = make_test_app().await;
    seed_teacher(&state, "taken").await;

    let res = app
        .oneshot(json_req(
            "POST",
            "/api/auth/register",
            None,
            None,
            json!({ "username": "taken", "name": "Other", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(res).await["success"], false);
}

#[tokio::test]
#[serial]
async fn register_rejects_short_password() {
    let (app, _) = make_test_app().await;

    let res = app
        .oneshot(json_req(
            "POST",
            "/api/auth/register",
            None,
            None,
            json!({ "username": "shorty", "name": "S", "password": "123" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn wrong_password_is_unauthorized() {
    let (app, state) = make_test_app().await;
    seed_teacher(&state, "teach").await;

    let res = app
        .oneshot(json_req(
            "POST",
            "/api/auth/login",
            None,
            None,
            json!({ "username": "teach", "password": "nope-nope" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn teacher_routes_require_a_token() {
    let (app, _) = make_test_app().await;

    for uri in ["/api/auth/me", "/api/sessions", "/api/classes"] {
        let res = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let res = app
        .oneshot(get("/api/sessions", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn password_change_checks_current_password() {
    let (app, state) = make_test_app().await;
    let (_, token) = seed_teacher(&state, "changer").await;

    let res = app
        .clone()
        .oneshot(json_req(
            "PUT",
            "/api/auth/password",
            Some(&token),
            None,
            json!({ "current_password": "wrong-one", "new_password": "brandnew" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .clone()
        .oneshot(json_req(
            "PUT",
            "/api/auth/password",
            Some(&token),
            None,
            json!({ "current_password": "password123", "new_password": "brandnew" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(json_req(
            "POST",
            "/api/auth/login",
            None,
            None,
            json!({ "username": "changer", "password": "brandnew" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
