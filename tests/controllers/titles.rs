use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use kushon::model::{ApiResponse, Title, TitleDetail, TitleStatus, Volume};
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppStateTest, get_request, insert_fake_publisher, insert_fake_title, json_request,
    response_json,
};

#[tokio::test]
async fn admin_creates_title_with_initial_volumes() {
    let test_state = AppStateTest::new();
    let publisher = insert_fake_publisher(&test_state).await;
    let (_, token) = test_state.generate_jwt_with_admin().await;

    let request = json_request(
        "POST",
        "/admin/titles",
        Some(&token),
        json!({
            "name": "Fullmetal Alchemist",
            "publisherId": publisher.id,
            "author": "Hiromu Arakawa",
            "volumes": [{ "number": 2 }, { "number": 1, "title": "The Two Alchemists" }]
        }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: ApiResponse<TitleDetail> = response_json(response).await;
    let detail = body.data.unwrap();
    assert_eq!(detail.title.slug, "fullmetal-alchemist");
    assert_eq!(detail.title.status, TitleStatus::Ongoing);
    assert_eq!(
        detail.volumes.iter().map(|v| v.number).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert!(test_state.mailer.sent.lock().await.is_empty());
}

#[tokio::test]
async fn create_title_rejects_unknown_publisher_and_bad_volume_numbers() {
    let test_state = AppStateTest::new();
    let publisher = insert_fake_publisher(&test_state).await;
    let (_, token) = test_state.generate_jwt_with_admin().await;

    let request = json_request(
        "POST",
        "/admin/titles",
        Some(&token),
        json!({ "name": "Orphan", "publisherId": Uuid::new_v4() }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = json_request(
        "POST",
        "/admin/titles",
        Some(&token),
        json!({ "name": "Zero", "publisherId": publisher.id, "volumes": [{ "number": 0 }] }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn index_and_show_are_public() {
    let test_state = AppStateTest::new();
    let title = insert_fake_title(&test_state, 3).await;

    let response = test_state.generate_response(get_request("/titles", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<Vec<Title>> = response_json(response).await;
    assert_eq!(body.data.unwrap().len(), 1);

    let response = test_state
        .generate_response(get_request(&format!("/titles/{}", title.title.id), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<TitleDetail> = response_json(response).await;
    assert_eq!(body.data.unwrap().volumes.len(), 3);

    let response = test_state
        .generate_response(get_request(
            &format!("/titles/{}/volumes", title.title.id),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<Vec<Volume>> = response_json(response).await;
    assert_eq!(
        body.data.unwrap().iter().map(|v| v.number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn show_with_malformed_id_is_bad_request() {
    let test_state = AppStateTest::new();

    let response = test_state
        .generate_response(get_request("/titles/not-a-uuid", None))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_renames_and_adds_new_volume_once() {
    let test_state = AppStateTest::new();
    let title = insert_fake_title(&test_state, 6).await;
    let (_, token) = test_state.generate_jwt_with_admin().await;
    let uri = format!("/admin/titles/{}", title.title.id);
    let volumes: Vec<_> = (1..=7).map(|number| json!({ "number": number })).collect();

    let request = json_request(
        "PUT",
        &uri,
        Some(&token),
        json!({ "name": "Renamed Saga", "status": "COMPLETED", "volumes": volumes }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: ApiResponse<TitleDetail> = response_json(response).await;
    let detail = body.data.unwrap();
    assert_eq!(detail.title.slug, "renamed-saga");
    assert_eq!(detail.title.status, TitleStatus::Completed);
    assert_eq!(detail.volumes.len(), 7);

    let request = json_request("PUT", &uri, Some(&token), json!({ "volumes": volumes }));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: ApiResponse<TitleDetail> = response_json(response).await;
    assert_eq!(body.data.unwrap().volumes.len(), 7);
}

#[tokio::test]
async fn resubmitting_volume_with_same_cover_sends_no_second_mail() {
    let test_state = AppStateTest::new();
    let title = insert_fake_title(&test_state, 6).await;
    let (subscriber, _) = test_state.generate_jwt_with_user().await;
    test_state
        .app_state
        .notifications
        .set_preference(subscriber.id, title.title.id, true)
        .await
        .unwrap();
    let (_, token) = test_state.generate_jwt_with_admin().await;
    let uri = format!("/admin/titles/{}", title.title.id);
    let body = json!({ "volumes": [
        { "number": 6 },
        { "number": 7, "coverImage": "https://covers.example.com/7.jpg" }
    ] });

    for _ in 0..2 {
        let request = json_request("PUT", &uri, Some(&token), body.clone());
        let response = test_state.generate_response(request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let detail: ApiResponse<TitleDetail> = response_json(response).await;
        let volumes = detail.data.unwrap().volumes;
        assert_eq!(volumes.len(), 7);
        assert_eq!(
            volumes[6].cover_image.as_deref(),
            Some("https://covers.example.com/7.jpg")
        );
    }

    let sent = test_state.mailer.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].volume_number, 7);
}

#[tokio::test]
async fn update_replaces_cover_of_existing_volume() {
    let test_state = AppStateTest::new();
    let title = insert_fake_title(&test_state, 2).await;
    let (_, token) = test_state.generate_jwt_with_admin().await;

    let request = json_request(
        "PUT",
        &format!("/admin/titles/{}", title.title.id),
        Some(&token),
        json!({ "volumes": [{ "number": 1, "coverImage": "https://covers.example.com/1.jpg" }] }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: ApiResponse<TitleDetail> = response_json(response).await;
    let detail = body.data.unwrap();
    assert_eq!(
        detail.volumes[0].cover_image.as_deref(),
        Some("https://covers.example.com/1.jpg")
    );
    assert_eq!(detail.volumes[1].cover_image, None);
}

#[tokio::test]
async fn update_unknown_title_is_not_found() {
    let test_state = AppStateTest::new();
    let (_, token) = test_state.generate_jwt_with_admin().await;

    let request = json_request(
        "PUT",
        &format!("/admin/titles/{}", Uuid::new_v4()),
        Some(&token),
        json!({ "name": "Ghost" }),
    );
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_title_and_volumes() {
    let test_state = AppStateTest::new();
    let title = insert_fake_title(&test_state, 2).await;
    let (_, token) = test_state.generate_jwt_with_admin().await;
    let uri = format!("/admin/titles/{}", title.title.id);

    let request = Request::builder()
        .method("DELETE")
        .uri(&uri)
        .header(
            axum::http::header::AUTHORIZATION,
            format!("bearer {}", token),
        )
        .body(Body::empty())
        .unwrap();
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_state
        .generate_response(get_request(&format!("/titles/{}", title.title.id), None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("DELETE")
        .uri(&uri)
        .header(
            axum::http::header::AUTHORIZATION,
            format!("bearer {}", token),
        )
        .body(Body::empty())
        .unwrap();
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
