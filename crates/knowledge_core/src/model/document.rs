//! Editable document owned by the article editor screen.
//!
//! # Invariants
//! - Mutated only by local edits and by reconciliation output.
//! - `tags` keeps the editor's comma-separated text form.

use crate::model::article::{join_tag_field, split_tag_field, Article, ArticleDraft};
use serde::{Deserialize, Serialize};

/// Content an empty rich-text editor reports.
pub const EMPTY_EDITOR_CONTENT: &str = "<p><br></p>";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    /// Markup string produced by the rich-text editor.
    pub content: String,
    pub tags: String,
}

impl Document {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: tags.into(),
        }
    }

    /// Editor state for an existing article.
    pub fn from_article(article: &Article) -> Self {
        Self::new(
            article.title.as_str(),
            article.content.as_str(),
            join_tag_field(&article.tags),
        )
    }

    /// `true` when there is no content beyond the editor's empty paragraph.
    pub fn is_content_empty(&self) -> bool {
        let trimmed = self.content.trim();
        trimmed.is_empty() || trimmed == EMPTY_EDITOR_CONTENT
    }

    pub fn to_draft(&self, category: impl Into<String>) -> ArticleDraft {
        ArticleDraft::new(
            self.title.as_str(),
            self.content.as_str(),
            category,
            &split_tag_field(self.tags.as_str()),
        )
    }
}
