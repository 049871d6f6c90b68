use axum::http::StatusCode;
use kushon::model::{ApiResponse, NotificationSetting};
use serde_json::json;
use uuid::Uuid;

use crate::{AppStateTest, get_request, insert_fake_title, json_request, response_json};

fn uri(title_id: Uuid) -> String {
    format!("/user/titles/{}/notifications", title_id)
}

async fn read_setting(test_state: &AppStateTest, title_id: Uuid, token: &str) -> bool {
    let response = test_state
        .generate_response(get_request(&uri(title_id), Some(token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: ApiResponse<NotificationSetting> = response_json(response).await;
    body.data.unwrap().email_on_new_volume
}

#[tokio::test]
async fn unset_preference_reads_as_disabled() {
    let test_state = AppStateTest::new();
    let title = insert_fake_title(&test_state, 1).await;
    let (_, token) = test_state.generate_jwt_with_user().await;

    assert!(!read_setting(&test_state, title.title.id, &token).await);
}

#[tokio::test]
async fn preference_can_be_toggled() {
    let test_state = AppStateTest::new();
    let title = insert_fake_title(&test_state, 1).await;
    let (_, token) = test_state.generate_jwt_with_user().await;

    for enabled in [true, false, true] {
        let request = json_request(
            "PUT",
            &uri(title.title.id),
            Some(&token),
            json!({ "emailOnNewVolume": enabled }),
        );
        let response = test_state.generate_response(request).await;
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(read_setting(&test_state, title.title.id, &token).await, enabled);
    }
}

#[tokio::test]
async fn setting_preference_for_unknown_title_is_not_found() {
    let test_state = AppStateTest::new();
    let (_, token) = test_state.generate_jwt_with_user().await;

    let request = json_request(
        "PUT",
        &uri(Uuid::new_v4()),
        Some(&token),
        json!({ "emailOnNewVolume": true }),
    );
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_flag_is_unprocessable() {
    let test_state = AppStateTest::new();
    let title = insert_fake_title(&test_state, 1).await;
    let (_, token) = test_state.generate_jwt_with_user().await;

    let request = json_request("PUT", &uri(title.title.id), Some(&token), json!({}));
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
