use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// Free-form per-snippet attributes, stored as a JSON document.
pub type Meta = Map<String, JsonValue>;

/// Snippet as returned to clients. The owner id is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub favicon_url: Option<String>,
    pub language: Option<String>,
    pub meta: Option<Meta>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnippetRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub favicon_url: Option<String>,
    pub language: Option<String>,
    pub meta: Option<Meta>,
    /// Raw tag names; null entries are tolerated and discarded
    #[serde(default)]
    pub tags: Option<Vec<Option<String>>>,
}

/// Full replacement of a snippet's editable fields. `faviconUrl` is not editable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSnippetRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub language: Option<String>,
    pub meta: Option<Meta>,
    #[serde(default)]
    pub tags: Option<Vec<Option<String>>>,
}
