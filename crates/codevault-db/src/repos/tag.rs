use anyhow::{anyhow, Context, Result};
use sqlx::PgConnection;
use uuid::Uuid;

use super::is_unique_violation;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TagRow {
    pub id: Uuid,
    pub name: String,
}

/// Tags are created lazily and never deleted. Every method takes a connection
/// so callers can run tag resolution inside the snippet write transaction.
pub struct TagRepo;

impl TagRepo {
    /// Case-insensitive lookup by name
    pub async fn find_by_name(conn: &mut PgConnection, name: &str) -> Result<Option<TagRow>> {
        let row = sqlx::query_as::<_, TagRow>(
            "SELECT id, name FROM tag WHERE lower(name) = lower($1)",
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to look up tag")?;
        Ok(row)
    }

    pub async fn insert(conn: &mut PgConnection, name: &str) -> Result<TagRow> {
        let row = sqlx::query_as::<_, TagRow>(
            "INSERT INTO tag (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .context("Failed to create tag")?;
        Ok(row)
    }

    /// Look the tag up, creating it when missing.
    ///
    /// Must run inside a transaction. The insert is wrapped in a savepoint so
    /// that losing a race against a concurrent insert of the same name only
    /// rolls back the insert; the lookup is then retried and sees the winner's
    /// row.
    pub async fn find_or_create(conn: &mut PgConnection, name: &str) -> Result<TagRow> {
        if let Some(tag) = Self::find_by_name(conn, name).await? {
            return Ok(tag);
        }

        sqlx::query("SAVEPOINT tag_insert")
            .execute(&mut *conn)
            .await
            .context("Failed to open tag savepoint")?;

        match Self::insert(conn, name).await {
            Ok(tag) => {
                sqlx::query("RELEASE SAVEPOINT tag_insert")
                    .execute(&mut *conn)
                    .await
                    .context("Failed to release tag savepoint")?;
                Ok(tag)
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!("Tag '{}' created concurrently, re-reading", name);
                sqlx::query("ROLLBACK TO SAVEPOINT tag_insert")
                    .execute(&mut *conn)
                    .await
                    .context("Failed to roll back tag savepoint")?;
                sqlx::query("RELEASE SAVEPOINT tag_insert")
                    .execute(&mut *conn)
                    .await
                    .context("Failed to release tag savepoint")?;
                Self::find_by_name(conn, name)
                    .await?
                    .ok_or_else(|| anyhow!("Tag '{}' missing after conflicting insert", name))
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve already-normalized names into tag rows, one per distinct tag.
    pub async fn resolve_all(conn: &mut PgConnection, names: &[String]) -> Result<Vec<TagRow>> {
        // Fixed order, so concurrent writers lock new names in the same sequence
        let mut ordered: Vec<&String> = names.iter().collect();
        ordered.sort_by_key(|name| name.to_lowercase());

        let mut tags: Vec<TagRow> = Vec::with_capacity(names.len());
        for name in ordered {
            let tag = Self::find_or_create(conn, name).await?;
            if !tags.iter().any(|t| t.id == tag.id) {
                tags.push(tag);
            }
        }
        Ok(tags)
    }
}
