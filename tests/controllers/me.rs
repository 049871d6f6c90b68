use axum::http::StatusCode;
use kushon::model::{ApiResponse, User};

use crate::{AppStateTest, get_request, response_json};

#[tokio::test]
async fn should_be_ok() {
    let test_state = AppStateTest::new();

    let (user, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(get_request("/me", Some(&token)))
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let body: ApiResponse<User> = response_json(response).await;
    let user_result = body.data.unwrap();

    assert_eq!(user.id, user_result.id);
    assert_eq!(user.email, user_result.email);
    assert_eq!(user.name, user_result.name);
}
