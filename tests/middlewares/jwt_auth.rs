use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use kushon::{
    auth::encode_jwt,
    model::{User, UserRole},
};
use uuid::Uuid;

use crate::{AppStateTest, get_request};

#[tokio::test]
async fn should_throw_error_when_request_does_not_contain_header_authorization() {
    let test_state = AppStateTest::new();

    let response = test_state.generate_response(get_request("/me", None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_throw_error_when_auth_header_is_invalid() {
    let test_state = AppStateTest::new();

    let request = Request::builder()
        .uri("/me")
        .header(axum::http::header::AUTHORIZATION, "random-string")
        .body(Body::empty())
        .unwrap();

    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_throw_error_when_auth_header_does_not_contain_bearer() {
    let test_state = AppStateTest::new();

    let request = Request::builder()
        .uri("/me")
        .header(
            axum::http::header::AUTHORIZATION,
            "not-bearer random-string",
        )
        .body(Body::empty())
        .unwrap();

    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_throw_error_when_jwt_token_is_invalid() {
    let test_state = AppStateTest::new();

    let response = test_state
        .generate_response(get_request("/me", Some("random-string")))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_throw_error_when_user_is_missing() {
    let test_state = AppStateTest::new();

    let ghost = User {
        id: Uuid::new_v4(),
        name: "Ghost".to_string(),
        email: "ghost@localhost".to_string(),
        role: UserRole::User,
    };
    let token = encode_jwt(&ghost, &test_state.app_state.config.jwt).unwrap();

    let response = test_state
        .generate_response(get_request("/me", Some(&token)))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_be_ok_when_user_is_exist() {
    let test_state = AppStateTest::new();

    let (_, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(get_request("/me", Some(&token)))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}
