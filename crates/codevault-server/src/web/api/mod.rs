pub mod auth;
pub mod middleware;
pub mod snippets;

use crate::error::ServiceError;
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use uuid::Uuid;

pub(crate) fn parse_uuid_param(value: &str, entity: &str) -> Result<Uuid, ServiceError> {
    value
        .parse::<Uuid>()
        .map_err(|_| ServiceError::InvalidInput(format!("Invalid {} ID", entity)))
}

pub fn build_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/me", get(auth::me))
        // Snippet routes
        .route(
            "/v1/snippets",
            get(snippets::list_snippets).post(snippets::create_snippet),
        )
        .route("/v1/snippets/search", get(snippets::search_snippets))
        .route(
            "/v1/snippets/{id}",
            get(snippets::get_snippet)
                .put(snippets::update_snippet)
                .delete(snippets::delete_snippet),
        )
        .with_state(state)
}
