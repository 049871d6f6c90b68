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
    model::{ApiResponse, NewVolume, Title, TitleDetail, TitleStatus, Volume},
    services::catalog::{CreateTitle, UpdateTitle},
    state::SharedAppState,
};

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRequest {
    #[validate(range(min = 1))]
    pub number: i32,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(url)]
    pub cover_image: Option<String>,
}

impl From<VolumeRequest> for NewVolume {
    fn from(value: VolumeRequest) -> Self {
        NewVolume {
            number: value.number,
            title: value.title,
            cover_image: value.cover_image,
        }
    }
}

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTitleRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub publisher_id: Uuid,
    pub status: Option<TitleStatus>,
    pub synopsis: Option<String>,
    #[validate(length(max = 200))]
    pub author: Option<String>,
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    #[validate(url)]
    pub cover_image: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub volumes: Vec<VolumeRequest>,
}

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTitleRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub publisher_id: Option<Uuid>,
    pub status: Option<TitleStatus>,
    pub synopsis: Option<String>,
    #[validate(length(max = 200))]
    pub author: Option<String>,
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    #[validate(url)]
    pub cover_image: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub volumes: Vec<VolumeRequest>,
}

#[tracing::instrument(name = "[GET] titles", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
) -> Result<Json<ApiResponse<Vec<Title>>>, Error> {
    let titles = app_state.catalog.list_titles().await?;

    Ok(Json(ApiResponse::data(titles)))
}

#[tracing::instrument(name = "[GET] titles/{id}", skip_all, fields(path.id = %id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TitleDetail>>, Error> {
    let title = app_state.catalog.get_title(id).await?;

    Ok(Json(ApiResponse::data(title)))
}

#[tracing::instrument(name = "[GET] titles/{id}/volumes", skip_all, fields(path.id = %id))]
pub async fn volumes(
    State(app_state): State<SharedAppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Volume>>>, Error> {
    let volumes = app_state.catalog.list_volumes(id).await?;

    Ok(Json(ApiResponse::data(volumes)))
}

#[tracing::instrument(name = "[POST] admin/titles", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<CreateTitleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TitleDetail>>), Error> {
    request.validate().map_err(Error::Validation)?;

    let title = app_state
        .catalog
        .create_title(CreateTitle {
            name: request.name,
            publisher_id: request.publisher_id,
            status: request.status,
            synopsis: request.synopsis,
            author: request.author,
            genre: request.genre,
            cover_image: request.cover_image,
            volumes: request.volumes.into_iter().map(NewVolume::from).collect(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(title, "Title created")),
    ))
}

#[tracing::instrument(name = "[PUT] admin/titles/{id}", skip_all, fields(path.id = %id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTitleRequest>,
) -> Result<Json<ApiResponse<TitleDetail>>, Error> {
    request.validate().map_err(Error::Validation)?;

    let title = app_state
        .catalog
        .update_title(
            id,
            UpdateTitle {
                name: request.name,
                publisher_id: request.publisher_id,
                status: request.status,
                synopsis: request.synopsis,
                author: request.author,
                genre: request.genre,
                cover_image: request.cover_image,
                volumes: request.volumes.into_iter().map(NewVolume::from).collect(),
            },
        )
        .await?;

    Ok(Json(ApiResponse::with_message(title, "Title updated")))
}

#[tracing::instrument(name = "[DELETE] admin/titles/{id}", skip_all, fields(path.id = %id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, Error> {
    app_state.catalog.delete_title(id).await?;

    Ok(Json(ApiResponse::message("Title deleted")))
}
