use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::Error,
    model::{ApiResponse, Publisher, PublisherDetail},
    state::SharedAppState,
};

#[derive(Deserialize, Debug, Validate)]
pub struct CreatePublisherRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 2, max = 100))]
    pub country: Option<String>,
}

#[tracing::instrument(name = "[GET] publishers", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
) -> Result<Json<ApiResponse<Vec<Publisher>>>, Error> {
    let publishers = app_state.catalog.list_publishers().await?;

    Ok(Json(ApiResponse::data(publishers)))
}

#[tracing::instrument(name = "[GET] publishers/{id}", skip_all, fields(path.id = %id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PublisherDetail>>, Error> {
    let publisher = app_state.catalog.get_publisher(id).await?;

    Ok(Json(ApiResponse::data(publisher)))
}

#[tracing::instrument(name = "[POST] admin/publishers", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<CreatePublisherRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Publisher>>), Error> {
    request.validate().map_err(Error::Validation)?;

    let publisher = app_state
        .catalog
        .create_publisher(request.name, request.country)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(publisher, "Publisher created")),
    ))
}
