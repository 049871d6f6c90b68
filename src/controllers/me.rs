use std::sync::Arc;

use axum::{Extension, Json};

use crate::{
    error::Error,
    model::{ApiResponse, User},
};

#[tracing::instrument(name = "[GET] me", skip_all)]
pub async fn index(
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<ApiResponse<User>>, Error> {
    Ok(Json(ApiResponse::data(User::clone(&user))))
}
