use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::Error,
    model::{ApiResponse, User, UserVolume, VolumeProgress, VolumeProgressUpdate},
    state::SharedAppState,
};

#[derive(Deserialize, Debug)]
pub struct UpdateProgressRequest {
    pub volumes: Vec<VolumeProgressUpdate>,
}

#[tracing::instrument(name = "[GET] user/titles/{title_id}/volumes", skip_all, fields(user_id = %user.id, title_id = %title_id))]
pub async fn index(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(title_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<VolumeProgress>>>, Error> {
    let progress = app_state.progress.get_progress(user.id, title_id).await?;

    Ok(Json(ApiResponse::data(progress)))
}

#[tracing::instrument(name = "[PUT] user/titles/{title_id}/volumes", skip_all, fields(user_id = %user.id, title_id = %title_id))]
pub async fn update(
    Extension(user): Extension<Arc<User>>,
    State(app_state): State<SharedAppState>,
    Path(title_id): Path<Uuid>,
    Json(request): Json<UpdateProgressRequest>,
) -> Result<Json<ApiResponse<Vec<UserVolume>>>, Error> {
    let applied = app_state
        .progress
        .update_progress(user.id, title_id, request.volumes)
        .await?;

    Ok(Json(ApiResponse::with_message(applied, "Progress updated")))
}
