use crate::auth::TokenService;
use crate::config::ServerConfig;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Create a new app state. The token signing keys are derived here, once.
    pub fn new(pool: PgPool, config: &ServerConfig) -> Self {
        Self {
            pool,
            tokens: Arc::new(TokenService::from_config(&config.auth)),
        }
    }
}
