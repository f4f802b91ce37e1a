use crate::accounts;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::web::api::middleware::AuthUser;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use codevault_common::models::auth::{LoginRequest, RefreshRequest, RegisterRequest};
use std::sync::Arc;

/// POST /api/auth/register
#[tracing::instrument(skip(state, payload))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(req) = payload?;
    let tokens = accounts::register(&state.pool, &state.tokens, &req).await?;
    Ok(Json(tokens))
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, payload))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(req) = payload?;
    let tokens = accounts::login(&state.pool, &state.tokens, &req).await?;
    Ok(Json(tokens))
}

/// POST /api/auth/refresh
#[tracing::instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(req) = payload?;
    let tokens = accounts::refresh(&state.pool, &state.tokens, &req.refresh_token).await?;
    Ok(Json(tokens))
}

/// GET /api/auth/me
#[tracing::instrument(skip(state))]
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let user = accounts::current_user(&state.pool, &identity.email).await?;
    Ok(Json(user))
}
