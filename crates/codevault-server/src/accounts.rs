//! Registration, login and token refresh.
//!
//! No session state is kept: every successful call hands out a brand-new
//! access/refresh pair signed by the [`TokenService`]. Earlier refresh tokens
//! are superseded, not revoked, and stay valid until they expire.

use crate::auth::{hash_password, verify_password, TokenService};
use crate::error::ServiceError;
use codevault_common::models::auth::{AuthResponse, LoginRequest, RegisterRequest, User};
use codevault_common::validation::{normalize_email, validate_registration};
use codevault_db::{is_unique_violation, NewUser, UserRepo, UserRow};
use sqlx::PgPool;
use uuid::Uuid;

fn to_user(row: UserRow) -> User {
    User {
        id: row.id,
        email: row.email,
        display_name: row.display_name,
        server_url: row.server_url,
        created_at: row.created_at,
    }
}

pub async fn register(
    pool: &PgPool,
    tokens: &TokenService,
    req: &RegisterRequest,
) -> Result<AuthResponse, ServiceError> {
    let registration = validate_registration(req).map_err(ServiceError::invalid_input)?;

    if UserRepo::exists_by_email(pool, &registration.email).await? {
        return Err(ServiceError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(registration.password)?;
    let user = NewUser {
        id: Uuid::new_v4(),
        email: &registration.email,
        password_hash: &password_hash,
        display_name: registration.display_name.as_deref(),
        server_url: &registration.server_url,
    };

    // A concurrent registration may win between the check and the insert
    if let Err(e) = UserRepo::create(pool, &user).await {
        if is_unique_violation(&e) {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }
        return Err(e.into());
    }

    tracing::info!("Registered user {}", registration.email);
    Ok(tokens.issue_pair(&registration.email)?)
}

pub async fn login(
    pool: &PgPool,
    tokens: &TokenService,
    req: &LoginRequest,
) -> Result<AuthResponse, ServiceError> {
    let email = normalize_email(&req.email);

    let user = UserRepo::get_by_email(pool, &email)
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ServiceError::InvalidCredentials);
    }

    Ok(tokens.issue_pair(&user.email)?)
}

/// Exchange a refresh token for a new pair
pub async fn refresh(
    pool: &PgPool,
    tokens: &TokenService,
    refresh_token: &str,
) -> Result<AuthResponse, ServiceError> {
    let email = tokens
        .verify(refresh_token)
        .map_err(|_| ServiceError::InvalidCredentials)?;

    let user = UserRepo::get_by_email(pool, &email)
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;

    Ok(tokens.issue_pair(&user.email)?)
}

/// Profile of the account behind an authenticated identity
pub async fn current_user(pool: &PgPool, email: &str) -> Result<User, ServiceError> {
    UserRepo::get_by_email(pool, email)
        .await?
        .map(to_user)
        .ok_or(ServiceError::NotFound("User"))
}
