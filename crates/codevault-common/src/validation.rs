use crate::models::auth::RegisterRequest;
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::str::FromStr;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Canonical form used for storing and looking up account emails.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Registration input after validation and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration<'a> {
    pub email: String,
    pub password: &'a str,
    pub display_name: Option<String>,
    pub server_url: String,
}

/// Validates a registration request. Email and password are required and the
/// password must have at least [`MIN_PASSWORD_LEN`] characters.
pub fn validate_registration(req: &RegisterRequest) -> Result<Registration<'_>> {
    let email = req.email.as_deref().map(normalize_email).unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();

    if email.is_empty() || password.chars().count() < MIN_PASSWORD_LEN {
        bail!(
            "Email and a password of at least {} characters are required",
            MIN_PASSWORD_LEN
        );
    }

    let server_url = req
        .server_url
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if server_url.is_empty() {
        bail!("serverUrl is required");
    }

    let display_name = req
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(Registration {
        email,
        password,
        display_name,
        server_url: server_url.to_string(),
    })
}

/// Title and body are mandatory on both create and update.
pub fn validate_snippet_fields(title: &str, body: &str) -> Result<()> {
    if title.trim().is_empty() {
        bail!("title must not be blank");
    }
    if body.trim().is_empty() {
        bail!("body must not be blank");
    }
    Ok(())
}

/// Trims raw tag names, drops null and empty entries, and removes
/// case-insensitive duplicates. The first spelling seen wins.
pub fn normalize_tags(raw: &[Option<String>]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .flatten()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Trimmed search query, or `None` when nothing is left to search for.
pub fn normalize_search_query(raw: &str) -> Option<&str> {
    let q = raw.trim();
    (!q.is_empty()).then_some(q)
}

pub fn validate_paging(size: u32) -> Result<()> {
    if size == 0 || size > MAX_PAGE_SIZE {
        bail!("size must be between 1 and {}", MAX_PAGE_SIZE);
    }
    Ok(())
}

/// Fields a caller may sort their own snippet listing by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Language,
}

impl FromStr for SortField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            "title" => Ok(SortField::Title),
            "language" => Ok(SortField::Language),
            other => bail!("Unsupported sort field '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// `asc` (any case) sorts ascending; everything else sorts descending.
    pub fn parse_lenient(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: Option<&str>, password: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: email.map(str::to_string),
            password: password.map(str::to_string),
            display_name: Some("  Ada  ".to_string()),
            server_url: Some(" https://vault.example.com ".to_string()),
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_validate_registration_normalizes() {
        let req = register(Some(" Ada@Example.com"), Some("password1"));
        let reg = validate_registration(&req).unwrap();
        assert_eq!(reg.email, "ada@example.com");
        assert_eq!(reg.password, "password1");
        assert_eq!(reg.display_name.as_deref(), Some("Ada"));
        assert_eq!(reg.server_url, "https://vault.example.com");
    }

    #[test]
    fn test_validate_registration_short_password() {
        let req = register(Some("a@b.com"), Some("1234567"));
        let err = validate_registration(&req).unwrap_err();
        assert!(err.to_string().contains("at least 8"));
    }

    #[test]
    fn test_validate_registration_exactly_min_length() {
        let req = register(Some("a@b.com"), Some("12345678"));
        assert!(validate_registration(&req).is_ok());
    }

    #[test]
    fn test_validate_registration_missing_email_or_password() {
        assert!(validate_registration(&register(None, Some("password1"))).is_err());
        assert!(validate_registration(&register(Some("a@b.com"), None)).is_err());
        assert!(validate_registration(&register(Some("   "), Some("password1"))).is_err());
    }

    #[test]
    fn test_validate_registration_missing_server_url() {
        let mut req = register(Some("a@b.com"), Some("password1"));
        req.server_url = None;
        let err = validate_registration(&req).unwrap_err();
        assert!(err.to_string().contains("serverUrl"));
    }

    #[test]
    fn test_blank_display_name_is_dropped() {
        let mut req = register(Some("a@b.com"), Some("password1"));
        req.display_name = Some("   ".to_string());
        assert!(validate_registration(&req).unwrap().display_name.is_none());
    }

    #[test]
    fn test_validate_snippet_fields() {
        assert!(validate_snippet_fields("title", "body").is_ok());
        assert!(validate_snippet_fields(" ", "body").is_err());
        assert!(validate_snippet_fields("title", "").is_err());
    }

    #[test]
    fn test_normalize_tags_case_insensitive_dedup() {
        let raw = vec![
            Some("Go".to_string()),
            Some("go".to_string()),
            Some(" GO ".to_string()),
        ];
        assert_eq!(normalize_tags(&raw), vec!["Go".to_string()]);
    }

    #[test]
    fn test_normalize_tags_drops_null_and_blank() {
        let raw = vec![
            None,
            Some("   ".to_string()),
            Some(" rust ".to_string()),
            Some(String::new()),
            Some("sql".to_string()),
        ];
        assert_eq!(
            normalize_tags(&raw),
            vec!["rust".to_string(), "sql".to_string()]
        );
    }

    #[test]
    fn test_normalize_tags_empty() {
        assert!(normalize_tags(&[]).is_empty());
    }

    #[test]
    fn test_normalize_search_query() {
        assert_eq!(normalize_search_query("  databse "), Some("databse"));
        assert_eq!(normalize_search_query("   "), None);
    }

    #[test]
    fn test_validate_paging() {
        assert!(validate_paging(1).is_ok());
        assert!(validate_paging(MAX_PAGE_SIZE).is_ok());
        assert!(validate_paging(0).is_err());
        assert!(validate_paging(MAX_PAGE_SIZE + 1).is_err());
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!("createdAt".parse::<SortField>().unwrap(), SortField::CreatedAt);
        assert_eq!("updated_at".parse::<SortField>().unwrap(), SortField::UpdatedAt);
        assert_eq!("title".parse::<SortField>().unwrap(), SortField::Title);
        assert!("userId".parse::<SortField>().is_err());
        assert!("title; DROP TABLE snippet".parse::<SortField>().is_err());
    }

    #[test]
    fn test_sort_direction_lenient() {
        assert_eq!(SortDirection::parse_lenient("ASC"), SortDirection::Asc);
        assert_eq!(SortDirection::parse_lenient("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::parse_lenient("desc"), SortDirection::Desc);
        assert_eq!(SortDirection::parse_lenient("sideways"), SortDirection::Desc);
    }
}
