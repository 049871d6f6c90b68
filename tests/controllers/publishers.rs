use axum::http::StatusCode;
use kushon::model::{ApiResponse, Publisher, PublisherDetail};
use serde_json::json;
use uuid::Uuid;

use crate::{AppStateTest, get_request, insert_fake_title, json_request, response_json};

#[tokio::test]
async fn admin_can_create_publisher() {
    let test_state = AppStateTest::new();
    let (_, token) = test_state.generate_jwt_with_admin().await;

    let request = json_request(
        "POST",
        "/admin/publishers",
        Some(&token),
        json!({ "name": "Shueisha", "country": "JP" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: ApiResponse<Publisher> = response_json(response).await;
    let publisher = body.data.unwrap();
    assert_eq!(publisher.name, "Shueisha");
    assert_eq!(publisher.country.as_deref(), Some("JP"));
}

#[tokio::test]
async fn create_publisher_validates_name() {
    let test_state = AppStateTest::new();
    let (_, token) = test_state.generate_jwt_with_admin().await;

    let request = json_request(
        "POST",
        "/admin/publishers",
        Some(&token),
        json!({ "name": "" }),
    );
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn index_is_ordered_by_name() {
    let test_state = AppStateTest::new();
    for name in ["Viz", "Kodansha", "Panini"] {
        test_state
            .app_state
            .catalog
            .create_publisher(name.to_string(), None)
            .await
            .unwrap();
    }

    let response = test_state
        .generate_response(get_request("/publishers", None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: ApiResponse<Vec<Publisher>> = response_json(response).await;
    let names: Vec<String> = body.data.unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Kodansha", "Panini", "Viz"]);
}

#[tokio::test]
async fn show_includes_titles() {
    let test_state = AppStateTest::new();
    let title = insert_fake_title(&test_state, 1).await;

    let response = test_state
        .generate_response(get_request(
            &format!("/publishers/{}", title.title.publisher_id),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: ApiResponse<PublisherDetail> = response_json(response).await;
    let publisher = body.data.unwrap();
    assert_eq!(publisher.titles.len(), 1);
    assert_eq!(publisher.titles[0].id, title.title.id);
}

#[tokio::test]
async fn show_unknown_publisher_is_not_found() {
    let test_state = AppStateTest::new();

    let response = test_state
        .generate_response(get_request(&format!("/publishers/{}", Uuid::new_v4()), None))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
