use crate::error::ServiceError;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Verified caller identity, stored in request extensions
#[derive(Debug, Clone)]
pub struct Identity {
    /// Normalized account email (the token subject)
    pub email: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Attach an [`Identity`] when the request carries a valid bearer token.
///
/// Missing or invalid tokens never fail the request here: it continues
/// anonymously and protected handlers reject it through [`AuthUser`].
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = bearer_token(req.headers()).and_then(|token| match state.tokens.verify(token) {
        Ok(email) => Some(Identity { email }),
        Err(_) => {
            tracing::debug!("Ignoring invalid bearer token");
            None
        }
    });

    if let Some(identity) = identity {
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}

/// Extractor for handlers that require an authenticated caller.
#[derive(Debug)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or(ServiceError::Unauthenticated)
    }
}
