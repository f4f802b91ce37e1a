use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use codevault_common::validation::{SortDirection, SortField};
use serde_json::Value as JsonValue;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

pub(crate) const SNIPPET_COLUMNS: &str =
    "s.id, s.user_id, s.title, s.body, s.favicon_url, s.language, s.meta, s.created_at, s.updated_at";

/// Snippet row from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnippetRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub favicon_url: Option<String>,
    pub language: Option<String>,
    pub meta: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New snippet for creation. `user_id` comes from the authenticated caller.
#[derive(Debug, Clone)]
pub struct NewSnippet<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub body: &'a str,
    pub favicon_url: Option<&'a str>,
    pub language: Option<&'a str>,
    pub meta: Option<JsonValue>,
}

/// Replacement values for the editable columns of a snippet
#[derive(Debug, Clone)]
pub struct SnippetEdit<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub language: Option<&'a str>,
    pub meta: Option<JsonValue>,
}

fn sort_clause(field: SortField, direction: SortDirection) -> String {
    let column = match field {
        SortField::CreatedAt => "s.created_at",
        SortField::UpdatedAt => "s.updated_at",
        SortField::Title => "s.title",
        SortField::Language => "s.language",
    };
    let dir = match direction {
        SortDirection::Asc => "ASC NULLS LAST",
        SortDirection::Desc => "DESC NULLS LAST",
    };
    format!("{column} {dir}, s.id {dir}")
}

/// Repository for snippet operations
pub struct SnippetRepo;

impl SnippetRepo {
    pub async fn create(conn: &mut PgConnection, snippet: &NewSnippet<'_>) -> Result<SnippetRow> {
        let row = sqlx::query_as::<_, SnippetRow>(&format!(
            r#"
            INSERT INTO snippet AS s (id, user_id, title, body, favicon_url, language, meta)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            SNIPPET_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(snippet.user_id)
        .bind(snippet.title)
        .bind(snippet.body)
        .bind(snippet.favicon_url)
        .bind(snippet.language)
        .bind(&snippet.meta)
        .fetch_one(&mut *conn)
        .await
        .context("Failed to create snippet")?;

        Ok(row)
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<SnippetRow>> {
        let row = sqlx::query_as::<_, SnippetRow>(&format!(
            "SELECT {} FROM snippet s WHERE s.id = $1",
            SNIPPET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get snippet by ID")?;

        Ok(row)
    }

    /// Replace the editable columns. `user_id` and `favicon_url` are left
    /// alone. `updated_at` always moves forward, even when two updates land
    /// within the clock's resolution.
    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        edit: &SnippetEdit<'_>,
    ) -> Result<Option<SnippetRow>> {
        let row = sqlx::query_as::<_, SnippetRow>(&format!(
            r#"
            UPDATE snippet AS s
            SET title = $2,
                body = $3,
                language = $4,
                meta = $5,
                updated_at = GREATEST(clock_timestamp(), s.updated_at + INTERVAL '1 microsecond')
            WHERE s.id = $1
            RETURNING {}
            "#,
            SNIPPET_COLUMNS
        ))
        .bind(id)
        .bind(edit.title)
        .bind(edit.body)
        .bind(edit.language)
        .bind(&edit.meta)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to update snippet")?;

        Ok(row)
    }

    /// Delete a snippet and its tag links. Returns whether a row existed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM snippet WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("Failed to delete snippet")?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the full tag set of a snippet
    pub async fn replace_tags(
        conn: &mut PgConnection,
        snippet_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<()> {
        sqlx::query("DELETE FROM snippet_tag WHERE snippet_id = $1")
            .bind(snippet_id)
            .execute(&mut *conn)
            .await
            .context("Failed to clear snippet tags")?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO snippet_tag (snippet_id, tag_id) SELECT $1, t FROM UNNEST($2::uuid[]) AS t ON CONFLICT DO NOTHING",
        )
        .bind(snippet_id)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await
        .context("Failed to link snippet tags")?;

        Ok(())
    }

    /// Tag names per snippet, sorted case-insensitively
    pub async fn tag_names(
        pool: &PgPool,
        snippet_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<String>>> {
        if snippet_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT st.snippet_id, t.name
            FROM snippet_tag st
            JOIN tag t ON t.id = st.tag_id
            WHERE st.snippet_id = ANY($1)
            ORDER BY lower(t.name)
            "#,
        )
        .bind(snippet_ids)
        .fetch_all(pool)
        .await
        .context("Failed to load snippet tags")?;

        let mut map: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (snippet_id, name) in rows {
            map.entry(snippet_id).or_default().push(name);
        }
        Ok(map)
    }

    /// Page through one user's snippets
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: Uuid,
        sort: SortField,
        direction: SortDirection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SnippetRow>> {
        let rows = sqlx::query_as::<_, SnippetRow>(&format!(
            "SELECT {} FROM snippet s WHERE s.user_id = $1 ORDER BY {} LIMIT $2 OFFSET $3",
            SNIPPET_COLUMNS,
            sort_clause(sort, direction)
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list snippets by owner")?;

        Ok(rows)
    }

    pub async fn count_by_owner(pool: &PgPool, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM snippet WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .context("Failed to count snippets by owner")?;
        Ok(count)
    }
}
