//! Snippet store operations and hybrid search.
//!
//! Writes that touch tags (create, update) run in one transaction, so a
//! failure part-way leaves neither the snippet change nor partial tag links.

use crate::error::ServiceError;
use anyhow::Context;
use codevault_common::models::page::Page;
use codevault_common::models::snippet::{
    CreateSnippetRequest, Meta, Snippet, UpdateSnippetRequest,
};
use codevault_common::validation::{
    normalize_search_query, normalize_tags, validate_paging, validate_snippet_fields,
    SortDirection, SortField,
};
use codevault_db::{
    NewSnippet, SearchRepo, SnippetEdit, SnippetRepo, SnippetRow, TagRepo, TagRow, UserRepo,
};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

fn meta_to_json(meta: &Option<Meta>) -> Option<JsonValue> {
    meta.clone().map(JsonValue::Object)
}

fn meta_from_json(value: Option<JsonValue>) -> Option<Meta> {
    match value {
        Some(JsonValue::Object(map)) => Some(map),
        _ => None,
    }
}

fn to_snippet(row: SnippetRow, tags: Vec<String>) -> Snippet {
    Snippet {
        id: row.id,
        title: row.title,
        body: row.body,
        favicon_url: row.favicon_url,
        language: row.language,
        meta: meta_from_json(row.meta),
        tags,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn sorted_tag_names(tags: &[TagRow]) -> Vec<String> {
    let mut names: Vec<String> = tags.iter().map(|t| t.name.clone()).collect();
    names.sort_by_key(|n| n.to_lowercase());
    names
}

fn offset(page: u32, size: u32) -> i64 {
    i64::from(page) * i64::from(size)
}

/// Attach tag names to a batch of rows, preserving row order
async fn with_tags(pool: &PgPool, rows: Vec<SnippetRow>) -> Result<Vec<Snippet>, ServiceError> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut tags = SnippetRepo::tag_names(pool, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let names = tags.remove(&row.id).unwrap_or_default();
            to_snippet(row, names)
        })
        .collect())
}

async fn owner_id(pool: &PgPool, owner_email: &str) -> Result<Uuid, ServiceError> {
    UserRepo::get_by_email(pool, owner_email)
        .await?
        .map(|u| u.id)
        .ok_or(ServiceError::NotFound("User"))
}

/// Create a snippet owned by the authenticated caller
#[tracing::instrument(skip(pool, req))]
pub async fn create(
    pool: &PgPool,
    req: &CreateSnippetRequest,
    owner_email: &str,
) -> Result<Snippet, ServiceError> {
    validate_snippet_fields(&req.title, &req.body).map_err(ServiceError::invalid_input)?;
    let user_id = owner_id(pool, owner_email).await?;
    let tag_names = normalize_tags(req.tags.as_deref().unwrap_or_default());

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let tags = TagRepo::resolve_all(&mut *tx, &tag_names).await?;
    let row = SnippetRepo::create(
        &mut *tx,
        &NewSnippet {
            user_id,
            title: &req.title,
            body: &req.body,
            favicon_url: req.favicon_url.as_deref(),
            language: req.language.as_deref(),
            meta: meta_to_json(&req.meta),
        },
    )
    .await?;
    let tag_ids: Vec<Uuid> = tags.iter().map(|t| t.id).collect();
    SnippetRepo::replace_tags(&mut *tx, row.id, &tag_ids).await?;

    tx.commit().await.context("Failed to commit snippet")?;

    tracing::info!("Created snippet {} with {} tag(s)", row.id, tags.len());
    Ok(to_snippet(row, sorted_tag_names(&tags)))
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Snippet, ServiceError> {
    let row = SnippetRepo::get(pool, id)
        .await?
        .ok_or(ServiceError::NotFound("Snippet"))?;
    let mut snippets = with_tags(pool, vec![row]).await?;
    snippets.pop().ok_or(ServiceError::NotFound("Snippet"))
}

/// Replace title, body, language, meta and the tag set. Owner and favicon
/// are never touched.
#[tracing::instrument(skip(pool, req))]
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateSnippetRequest,
) -> Result<Snippet, ServiceError> {
    validate_snippet_fields(&req.title, &req.body).map_err(ServiceError::invalid_input)?;
    let tag_names = normalize_tags(req.tags.as_deref().unwrap_or_default());

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = SnippetRepo::update(
        &mut *tx,
        id,
        &SnippetEdit {
            title: &req.title,
            body: &req.body,
            language: req.language.as_deref(),
            meta: meta_to_json(&req.meta),
        },
    )
    .await?
    .ok_or(ServiceError::NotFound("Snippet"))?;

    let tags = TagRepo::resolve_all(&mut *tx, &tag_names).await?;
    let tag_ids: Vec<Uuid> = tags.iter().map(|t| t.id).collect();
    SnippetRepo::replace_tags(&mut *tx, row.id, &tag_ids).await?;

    tx.commit().await.context("Failed to commit snippet update")?;

    Ok(to_snippet(row, sorted_tag_names(&tags)))
}

/// Idempotent: deleting an unknown id succeeds
#[tracing::instrument(skip(pool))]
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ServiceError> {
    if !SnippetRepo::delete(pool, id).await? {
        tracing::debug!("Snippet {} did not exist", id);
    }
    Ok(())
}

/// One page of the caller's own snippets
pub async fn list_by_owner(
    pool: &PgPool,
    owner_email: &str,
    page: u32,
    size: u32,
    sort: SortField,
    direction: SortDirection,
) -> Result<Page<Snippet>, ServiceError> {
    validate_paging(size).map_err(ServiceError::invalid_input)?;
    let user_id = owner_id(pool, owner_email).await?;

    let rows = SnippetRepo::list_by_owner(
        pool,
        user_id,
        sort,
        direction,
        i64::from(size),
        offset(page, size),
    )
    .await?;
    let total = SnippetRepo::count_by_owner(pool, user_id).await?;

    Ok(Page::new(with_tags(pool, rows).await?, page, size, total))
}

/// Ranked full-text + trigram search over all snippets
pub async fn search(
    pool: &PgPool,
    q: &str,
    page: u32,
    size: u32,
) -> Result<Page<Snippet>, ServiceError> {
    validate_paging(size).map_err(ServiceError::invalid_input)?;
    let Some(q) = normalize_search_query(q) else {
        return Ok(Page::empty(page, size));
    };

    let hits = SearchRepo::search(pool, q, i64::from(size), offset(page, size)).await?;
    let total = SearchRepo::count(pool, q).await?;
    tracing::debug!("Search '{}' matched {} row(s)", q, total);

    let rows = hits.into_iter().map(|hit| hit.snippet).collect();
    Ok(Page::new(with_tags(pool, rows).await?, page, size, total))
}
