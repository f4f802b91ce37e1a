//! Hybrid snippet search.
//!
//! Two signals are computed by PostgreSQL at query time:
//!
//! - a lexical rank (`ts_rank_cd`) of the english full-text document built
//!   from title and body against `plainto_tsquery(q)`;
//! - the `pg_trgm` similarity between the query and the title alone.
//!
//! A row qualifies when the document matches the query OR the trigram
//! similarity exceeds [`TRIGRAM_SIMILARITY_FLOOR`]. Rows are ranked by the
//! greater of the two scores. The page query and the count query share one
//! predicate so totals always agree with the pages.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::repos::snippet::{SnippetRow, SNIPPET_COLUMNS};

/// Trigram similarity a title must exceed to qualify on its own
pub const TRIGRAM_SIMILARITY_FLOOR: f32 = 0.25;

const DOCUMENT: &str =
    "to_tsvector('english', coalesce(s.title, '') || ' ' || coalesce(s.body, ''))";
const TS_QUERY: &str = "plainto_tsquery('english', $1)";

fn match_predicate() -> String {
    format!("({DOCUMENT} @@ {TS_QUERY} OR similarity(s.title, $1) > $2)")
}

/// A search result with the scores it was ranked by
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchHit {
    #[sqlx(flatten)]
    pub snippet: SnippetRow,
    pub lexical_rank: f32,
    pub trigram_similarity: f32,
    pub score: f32,
}

impl SearchHit {
    /// True when the row only qualified through the title similarity
    pub fn matched_by_trigram_only(&self) -> bool {
        self.lexical_rank == 0.0 && self.trigram_similarity > TRIGRAM_SIMILARITY_FLOOR
    }
}

pub struct SearchRepo;

impl SearchRepo {
    /// Ranked page of matches. Ties on score fall back to snippet id so
    /// consecutive pages never overlap.
    pub async fn search(pool: &PgPool, q: &str, limit: i64, offset: i64) -> Result<Vec<SearchHit>> {
        let sql = format!(
            r#"
            SELECT {columns}, ranked.lexical_rank, ranked.trigram_similarity,
                   GREATEST(ranked.lexical_rank, ranked.trigram_similarity) AS score
            FROM snippet s
            CROSS JOIN LATERAL (
                SELECT ts_rank_cd({DOCUMENT}, {TS_QUERY}) AS lexical_rank,
                       similarity(s.title, $1) AS trigram_similarity
            ) ranked
            WHERE {predicate}
            ORDER BY score DESC, s.id
            LIMIT $3 OFFSET $4
            "#,
            columns = SNIPPET_COLUMNS,
            predicate = match_predicate(),
        );

        let hits = sqlx::query_as::<_, SearchHit>(&sql)
            .bind(q)
            .bind(TRIGRAM_SIMILARITY_FLOOR)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
            .context("Failed to search snippets")?;

        Ok(hits)
    }

    /// Number of rows the same query matches across all pages
    pub async fn count(pool: &PgPool, q: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM snippet s WHERE {}",
            match_predicate()
        ))
        .bind(q)
        .bind(TRIGRAM_SIMILARITY_FLOOR)
        .fetch_one(pool)
        .await
        .context("Failed to count search results")?;

        Ok(count)
    }
}
