use crate::error::ServiceError;
use crate::snippets;
use crate::state::AppState;
use crate::web::api::middleware::AuthUser;
use crate::web::api::parse_uuid_param;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use codevault_common::models::snippet::{CreateSnippetRequest, UpdateSnippetRequest};
use codevault_common::validation::{SortDirection, SortField, DEFAULT_PAGE_SIZE};
use serde::Deserialize;
use std::sync::Arc;

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_sort_by() -> String {
    "createdAt".to_string()
}

fn default_direction() -> String {
    "desc".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSnippetsQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_direction")]
    pub direction: String,
}

/// POST /api/v1/snippets
#[tracing::instrument(skip(state, payload))]
pub async fn create_snippet(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    payload: Result<Json<CreateSnippetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(req) = payload?;
    let snippet = snippets::create(&state.pool, &req, &identity.email).await?;
    Ok(Json(snippet))
}

/// GET /api/v1/snippets/:id
#[tracing::instrument(skip(state))]
pub async fn get_snippet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_uuid_param(&id, "snippet")?;
    let snippet = snippets::get(&state.pool, id).await?;
    Ok(Json(snippet))
}

/// PUT /api/v1/snippets/:id
#[tracing::instrument(skip(state, payload))]
pub async fn update_snippet(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSnippetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(req) = payload?;
    let id = parse_uuid_param(&id, "snippet")?;
    let snippet = snippets::update(&state.pool, id, &req).await?;
    Ok(Json(snippet))
}

/// DELETE /api/v1/snippets/:id
#[tracing::instrument(skip(state))]
pub async fn delete_snippet(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_uuid_param(&id, "snippet")?;
    snippets::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/snippets/search - public ranked search
#[tracing::instrument(skip(state))]
pub async fn search_snippets(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Query(query) = query?;
    let q = query
        .q
        .ok_or_else(|| ServiceError::InvalidInput("q is required".to_string()))?;
    let page = snippets::search(&state.pool, &q, query.page, query.size).await?;
    Ok(Json(page))
}

/// GET /api/v1/snippets - the caller's own snippets
#[tracing::instrument(skip(state))]
pub async fn list_snippets(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    query: Result<Query<ListSnippetsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Query(query) = query?;
    let sort: SortField = query.sort_by.parse().map_err(ServiceError::invalid_input)?;
    let direction = SortDirection::parse_lenient(&query.direction);
    let page = snippets::list_by_owner(
        &state.pool,
        &identity.email,
        query.page,
        query.size,
        sort,
        direction,
    )
    .await?;
    Ok(Json(page))
}
