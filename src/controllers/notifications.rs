use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{ApiResponse, NotificationSetting, User},
    state::SharedAppState,
};

#[tracing::instrument(name = "[GET] user/titles/{title_id}/notifications", skip_all, fields(user_id = %user.id, title_id = %title_id))]
pub async fn show(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(title_id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationSetting>>, Error> {
    let setting = app_state
        .notifications
        .get_preference(user.id, title_id)
        .await?;

    Ok(Json(ApiResponse::data(setting)))
}

#[tracing::instrument(name = "[PUT] user/titles/{title_id}/notifications", skip_all, fields(user_id = %user.id, title_id = %title_id))]
pub async fn update(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(title_id): Path<Uuid>,
    Json(request): Json<NotificationSetting>,
) -> Result<Json<ApiResponse<NotificationSetting>>, Error> {
    let setting = app_state
        .notifications
        .set_preference(user.id, title_id, request.email_on_new_volume)
        .await?;

    Ok(Json(ApiResponse::with_message(
        setting,
        "Notification preference saved",
    )))
}
