use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, display_name, server_url, created_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub server_url: String,
    pub created_at: DateTime<Utc>,
}

/// Account to insert. `email` must already be normalized.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub display_name: Option<&'a str>,
    pub server_url: &'a str,
}

pub struct UserRepo;

impl UserRepo {
    /// Insert a user. A duplicate email surfaces as an error
    /// for which [`crate::is_unique_violation`] returns true.
    pub async fn create(pool: &PgPool, user: &NewUser<'_>) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_account (id, email, password_hash, display_name, server_url) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.display_name)
        .bind(user.server_url)
        .execute(pool)
        .await
        .context("Failed to create user")?;
        Ok(())
    }

    pub async fn exists_by_email(pool: &PgPool, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_account WHERE email = $1)")
                .bind(email)
                .fetch_one(pool)
                .await
                .context("Failed to check user email")?;
        Ok(exists)
    }

    pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM user_account WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by email")?;
        Ok(row)
    }
}
