use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::{
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::models::AppState;

pub fn build_router(state: AppState) -> Router {
    let static_routes = Router::new()
        .route("/static/client.js", get(handlers::pages::client_js))
        .route("/static/styles.css", get(handlers::pages::styles_css))
        .layer(ServiceBuilder::new().layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        )));

    Router::new()
        .route("/", get(handlers::pages::index))
        .route("/sse", get(handlers::sse::sse_handler))
        .route("/users", get(handlers::users::users_list).post(handlers::users::users_create))
        .route("/users/:email", delete(handlers::users::users_delete))
        .merge(static_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
