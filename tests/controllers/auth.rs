use axum::{
    body::Body,
    http::{self, Request, StatusCode},
};
use kushon::{auth::decode_jwt, controllers::auth::AuthResponse, model::ApiResponse};
use serde_json::json;

use crate::{AppStateTest, PASSWORD, json_request, response_json, test_config};

#[tokio::test]
async fn should_be_error_when_body_is_missing() {
    let test_state = AppStateTest::new();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::empty())
        .unwrap();

    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_be_error_when_body_is_invalid() {
    let test_state = AppStateTest::new();

    // -----------------------------------------------------------------------
    let request = json_request(
        "POST",
        "/auth/login",
        None,
        json!({ "email": "test@localhost" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // -----------------------------------------------------------------------
    let request = json_request(
        "POST",
        "/auth/login",
        None,
        json!({ "email": "a", "password": "pass" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // -----------------------------------------------------------------------
    let request = json_request(
        "POST",
        "/auth/register",
        None,
        json!({ "name": "", "email": "reader@localhost", "password": "123" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_be_error_when_has_incorrect_type() {
    let test_state = AppStateTest::new();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .body(Body::from(
            serde_json::to_vec(&json!({ "email": "test@localhost", "password": PASSWORD }))
                .unwrap(),
        ))
        .unwrap();

    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn register_creates_user_and_returns_token() {
    let test_state = AppStateTest::new();

    let request = json_request(
        "POST",
        "/auth/register",
        None,
        json!({ "name": "Reader", "email": "Reader@Localhost", "password": PASSWORD }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: ApiResponse<AuthResponse> = response_json(response).await;
    assert!(body.success);
    let auth = body.data.unwrap();
    assert_eq!(auth.user.email, "reader@localhost");

    let claims = decode_jwt(&auth.access_token, &test_state.app_state.config.jwt)
        .unwrap()
        .claims;
    assert_eq!(claims.sub, auth.user.id);
}

#[tokio::test]
async fn register_is_conflict_when_email_is_taken() {
    let test_state = AppStateTest::new();
    let (user, _) = test_state.generate_jwt_with_user().await;

    let request = json_request(
        "POST",
        "/auth/register",
        None,
        json!({ "name": "Someone", "email": user.email, "password": PASSWORD }),
    );
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: ApiResponse<()> = response_json(response).await;
    assert!(!body.success);
}

#[tokio::test]
async fn register_is_forbidden_when_registration_is_disabled() {
    let mut config = test_config();
    config.application.allow_registration = false;
    let test_state = AppStateTest::new_with_config(config);

    let request = json_request(
        "POST",
        "/auth/register",
        None,
        json!({ "name": "Reader", "email": "reader@localhost", "password": PASSWORD }),
    );
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(
        test_state
            .app_state
            .gateway
            .find_user_by_email("reader@localhost")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn should_be_error_when_credential_is_invalid() {
    let test_state = AppStateTest::new();

    let (user, _) = test_state.generate_jwt_with_user().await;

    let request = json_request(
        "POST",
        "/auth/login",
        None,
        json!({ "email": user.email, "password": "incorrect-password" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = json_request(
        "POST",
        "/auth/login",
        None,
        json!({ "email": "nobody@localhost", "password": PASSWORD }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_be_ok_when_user_is_exist() {
    let test_state = AppStateTest::new();

    let (user, _) = test_state.generate_jwt_with_user().await;

    let request = json_request(
        "POST",
        "/auth/login",
        None,
        json!({ "email": user.email, "password": PASSWORD }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: ApiResponse<AuthResponse> = response_json(response).await;
    let auth = body.data.unwrap();
    assert_eq!(auth.user.id, user.id);
    assert!(!auth.access_token.is_empty());
}
