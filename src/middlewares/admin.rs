use std::sync::Arc;

use axum::{Extension, body::Body, extract::Request, middleware::Next, response::Response};

use crate::{auth::error::AuthError, error::Error, model::User};

/// Must be layered inside [`super::jwt_auth_middleware`].
#[tracing::instrument(name = "[MIDDLEWARE] require admin", skip_all)]
pub async fn require_admin(
    Extension(user): Extension<Arc<User>>,
    req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    if !user.is_admin() {
        tracing::warn!(user_id = %user.id, "Non-admin user tried an admin route");
        return Err(Error::Auth(AuthError::Forbidden));
    }

    Ok(next.run(req).await)
}
