pub mod api;

use crate::state::AppState;
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// The browser extension calls from arbitrary origins
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Full HTTP surface. Every request passes the bearer-token intercept, which
/// only ever attaches an identity and never rejects on its own.
pub fn build_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .nest("/api", api::build_api_routes(state.clone()))
        .layer(middleware::from_fn_with_state(
            state,
            api::middleware::authenticate,
        ))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
