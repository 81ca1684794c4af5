//! Article wire model.
//!
//! # Responsibility
//! - Mirror the backend article and page payloads.
//! - Accept `tags` as either a comma string or a string array on read.
//! - Send `tags` as one comma-joined string on write.
//!
//! # Invariants
//! - Tag values are trimmed, non-empty, and deduplicated in first-seen order.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Article categories offered by the editor.
pub const ARTICLE_CATEGORIES: &[&str] = &[
    "Tech", "AI", "Backend", "Frontend", "DevOps", "Cloud", "Mobile",
];

pub type ArticleId = i64;

/// Article as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default, alias = "author")]
    pub author_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Article {
    /// Author label with the same fallback as the reader view.
    pub fn author_label(&self) -> &str {
        self.author_name
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or("Anonymous")
    }
}

/// Create/update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(serialize_with = "serialize_tags")]
    pub tags: Vec<String>,
}

impl ArticleDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
        tags: &[String],
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category: category.into(),
            tags: normalize_tags(tags.iter().map(String::as_str)),
        }
    }
}

/// Spring-style page envelope used by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages
    }
}

/// Trims, drops empties and deduplicates tags, keeping first-seen order.
pub fn normalize_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() || normalized.iter().any(|seen| seen == trimmed) {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}

/// Splits the editor's comma-separated tag field.
pub fn split_tag_field(field: &str) -> Vec<String> {
    normalize_tags(field.split(','))
}

/// Joins tags back into the editor's comma-separated field.
pub fn join_tag_field(tags: &[String]) -> String {
    tags.join(", ")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsRepr {
    List(Vec<String>),
    Joined(String),
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Option::<TagsRepr>::deserialize(deserializer)? {
        Some(TagsRepr::List(values)) => normalize_tags(values.iter().map(String::as_str)),
        Some(TagsRepr::Joined(value)) => split_tag_field(value.as_str()),
        None => Vec::new(),
    };
    Ok(tags)
}

fn serialize_tags<S>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(tags.join(",").as_str())
}
