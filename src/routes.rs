use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, Request, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    controllers::{auth, home, me, notifications, progress, publishers, titles},
    middlewares::{jwt_auth_middleware, require_admin},
    state::AppState,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn init_router(app_state: AppState) -> Router {
    let state = Arc::new(app_state);

    let app = Router::new()
        .route("/", get(home::index))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/publishers", get(publishers::index))
        .route("/publishers/{id}", get(publishers::show))
        .route("/titles", get(titles::index))
        .route("/titles/{id}", get(titles::show))
        .route("/titles/{id}/volumes", get(titles::volumes));

    let me_route = Router::new()
        .route("/", get(me::index))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let user_route = Router::new()
        .route(
            "/titles/{title_id}/volumes",
            get(progress::index).put(progress::update),
        )
        .route(
            "/titles/{title_id}/notifications",
            get(notifications::show).put(notifications::update),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let admin_route = Router::new()
        .route("/publishers", post(publishers::store))
        .route("/titles", post(titles::store))
        .route("/titles/{id}", put(titles::update).delete(titles::destroy))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let x_request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_id_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|val| val.to_str().ok())
                    .unwrap_or("");
                let user_agent = request
                    .headers()
                    .get(header::USER_AGENT)
                    .and_then(|val| val.to_str().ok())
                    .unwrap_or("");

                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                tracing::info_span!(
                    "http_request",
                    request_id,
                    method = ?request.method(),
                    uri = ?request.uri(),
                    path = matched_path,
                    version = ?request.version(),
                    user_agent,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id_header));

    app.nest("/me", me_route)
        .nest("/user", user_route)
        .nest("/admin", admin_route)
        .layer(CompressionLayer::new())
        .layer(request_id_middleware)
        .with_state(state)
}
