use std::time::Duration;

use axum::http::StatusCode;
use kushon::{
    model::{TitleDetail, User, UserRole},
    services::drain_fanouts,
};
use serde_json::json;

use crate::{AppStateTest, RecordingMailer, insert_fake_title, json_request, test_config};

async fn subscribe(test_state: &AppStateTest, title: &TitleDetail) -> User {
    let (user, _) = test_state.generate_jwt_with_user().await;
    test_state
        .app_state
        .notifications
        .set_preference(user.id, title.title.id, true)
        .await
        .unwrap();
    user
}

async fn add_volumes(test_state: &AppStateTest, title: &TitleDetail, numbers: &[i32]) {
    let (_, token) = test_state.generate_jwt_with_admin().await;
    let volumes: Vec<_> = numbers.iter().map(|n| json!({ "number": n })).collect();

    let request = json_request(
        "PUT",
        &format!("/admin/titles/{}", title.title.id),
        Some(&token),
        json!({ "volumes": volumes }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn subscribers_are_mailed_once_per_new_volume() {
    let test_state = AppStateTest::new();
    let title = insert_fake_title(&test_state, 6).await;
    let subscriber = subscribe(&test_state, &title).await;
    let (not_subscribed, _) = test_state.generate_jwt_with_user().await;

    add_volumes(&test_state, &title, &[1, 2, 3, 4, 5, 6, 7]).await;
    add_volumes(&test_state, &title, &[1, 2, 3, 4, 5, 6, 7]).await;

    let sent = test_state.mailer.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient_email, subscriber.email);
    assert_eq!(sent[0].title_name, title.title.name);
    assert_eq!(sent[0].volume_number, 7);
    assert!(sent.iter().all(|m| m.recipient_email != not_subscribed.email));
}

#[tokio::test]
async fn failing_recipient_does_not_block_the_others_or_the_update() {
    let mailer = RecordingMailer {
        failing: vec!["broken@localhost".to_string()],
        ..Default::default()
    };
    let test_state = AppStateTest::new_with_mailer(test_config(), mailer);
    let title = insert_fake_title(&test_state, 1).await;

    let first = subscribe(&test_state, &title).await;
    let broken = test_state
        .create_user_with_email("broken@localhost", UserRole::User)
        .await;
    test_state
        .app_state
        .notifications
        .set_preference(broken.id, title.title.id, true)
        .await
        .unwrap();
    let third = subscribe(&test_state, &title).await;

    add_volumes(&test_state, &title, &[2]).await;

    let sent = test_state.mailer.sent.lock().await;
    let mut recipients: Vec<&str> = sent.iter().map(|m| m.recipient_email.as_str()).collect();
    recipients.sort();
    let mut expected = vec![first.email.as_str(), third.email.as_str()];
    expected.sort();
    assert_eq!(recipients, expected);
}

#[tokio::test]
async fn detached_fanout_delivers_after_the_response() {
    let mut config = test_config();
    config.notifications.detached = true;
    let test_state = AppStateTest::new_with_config(config);
    let title = insert_fake_title(&test_state, 1).await;
    let subscriber = subscribe(&test_state, &title).await;

    add_volumes(&test_state, &title, &[2]).await;

    assert!(drain_fanouts(&test_state.app_state.fanouts, Duration::from_secs(5)).await);

    let sent = test_state.mailer.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient_email, subscriber.email);
    assert_eq!(sent[0].volume_number, 2);
}
