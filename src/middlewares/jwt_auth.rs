use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{decode_jwt, error::AuthError},
    error::Error,
    state::SharedAppState,
};

#[tracing::instrument(name = "[MIDDLEWARE] jwt auth", skip_all)]
pub async fn jwt_auth_middleware(
    State(app_state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let auth_header = match req.headers().get(AUTHORIZATION) {
        Some(header) => header
            .to_str()
            .map_err(|_| Error::Auth(AuthError::Unauthenticated))?,
        None => {
            return Err(Error::Auth(AuthError::Unauthenticated));
        }
    };

    let mut header = auth_header.split_whitespace();
    let (bearer_option, token_option) = (header.next(), header.next());

    let bearer = match bearer_option {
        Some(value) => value.to_lowercase(),
        None => {
            return Err(Error::Auth(AuthError::Unauthenticated));
        }
    };

    if bearer != *"bearer" {
        return Err(Error::Auth(AuthError::Unauthenticated));
    }

    let token = match token_option {
        Some(value) => value,
        None => {
            return Err(Error::Auth(AuthError::Unauthenticated));
        }
    };

    let token_data = decode_jwt(token, &app_state.config.jwt)
        .map_err(|_| Error::Auth(AuthError::Unauthenticated))?;

    // Role comes from the stored user, not from the token.
    let user = match app_state.gateway.find_user_by_id(token_data.claims.sub).await? {
        Some(user) => Arc::new(user),
        None => {
            return Err(Error::Auth(AuthError::Unauthenticated));
        }
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
