//! Article use-case service.
//!
//! # Responsibility
//! - Provide list/get/create/update/delete APIs over the backend.
//! - Normalize list parameters before they reach the wire.
//!
//! # Invariants
//! - Page sizes are clamped to `1..=ARTICLE_PAGE_SIZE_MAX`.
//! - Blank search/category filters are omitted, never sent empty.
//! - Drafts are validated before any request is issued.

use crate::api::client::{ApiClient, HttpTransport};
use crate::api::request::ApiRequest;
use crate::api::response::ApiError;
use crate::auth::store::CredentialStore;
use crate::model::article::{Article, ArticleDraft, ArticleId, Page};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Page size of the public article grid.
pub const ARTICLE_PAGE_SIZE_DEFAULT: u32 = 9;
/// Page size of the "manage my articles" table.
pub const MY_ARTICLES_PAGE_SIZE_DEFAULT: u32 = 10;
pub const ARTICLE_PAGE_SIZE_MAX: u32 = 50;

#[derive(Debug)]
pub enum ArticleServiceError {
    /// Draft is missing a required field.
    InvalidDraft(&'static str),
    Api(ApiError),
}

impl Display for ArticleServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDraft(details) => write!(f, "invalid article draft: {details}"),
            Self::Api(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ArticleServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::InvalidDraft(_) => None,
        }
    }
}

impl From<ApiError> for ArticleServiceError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<serde_json::Error> for ArticleServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Api(ApiError::Decode(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// List parameters (`page`, `size`, `sortBy`, `direction`, `search`, `category`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleQuery {
    /// Zero-based page index.
    pub page: u32,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub direction: Option<SortDirection>,
    pub search: Option<String>,
    /// `None` (or "All") lists every category.
    pub category: Option<String>,
}

impl ArticleQuery {
    fn to_request(&self, path: &str, default_size: u32) -> ApiRequest {
        let mut request = ApiRequest::get(path)
            .with_query("page", self.page)
            .with_query("size", normalize_page_size(self.size, default_size));
        if let Some(sort_by) = non_blank(self.sort_by.as_deref()) {
            request = request.with_query("sortBy", sort_by);
        }
        if let Some(direction) = self.direction {
            request = request.with_query("direction", direction.as_str());
        }
        if let Some(search) = non_blank(self.search.as_deref()) {
            request = request.with_query("search", search);
        }
        if let Some(category) =
            non_blank(self.category.as_deref()).filter(|value| !value.eq_ignore_ascii_case("all"))
        {
            request = request.with_query("category", category);
        }
        request
    }
}

/// Clamps a requested page size; `None` and `0` use `default_size`.
pub fn normalize_page_size(size: Option<u32>, default_size: u32) -> u32 {
    match size {
        Some(0) | None => default_size,
        Some(value) if value > ARTICLE_PAGE_SIZE_MAX => ARTICLE_PAGE_SIZE_MAX,
        Some(value) => value,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn validate_draft(draft: &ArticleDraft) -> Result<(), ArticleServiceError> {
    if draft.title.trim().is_empty() {
        return Err(ArticleServiceError::InvalidDraft("title must not be empty"));
    }
    if draft.category.trim().is_empty() {
        return Err(ArticleServiceError::InvalidDraft("category must not be empty"));
    }
    Ok(())
}

/// Article facade over the API client.
pub struct ArticleService<'a, T: HttpTransport, S: CredentialStore> {
    client: &'a ApiClient<T, S>,
}

impl<'a, T: HttpTransport, S: CredentialStore> ArticleService<'a, T, S> {
    pub fn new(client: &'a ApiClient<T, S>) -> Self {
        Self { client }
    }

    /// Public, paginated article listing.
    pub async fn list_articles(
        &self,
        query: &ArticleQuery,
    ) -> Result<Page<Article>, ArticleServiceError> {
        let request = query.to_request("/articles", ARTICLE_PAGE_SIZE_DEFAULT);
        Ok(self.client.fetch_data(request).await?)
    }

    /// Articles authored by the signed-in user.
    pub async fn list_my_articles(
        &self,
        query: &ArticleQuery,
    ) -> Result<Page<Article>, ArticleServiceError> {
        let request = query.to_request("/articles/my", MY_ARTICLES_PAGE_SIZE_DEFAULT);
        Ok(self.client.fetch_data(request).await?)
    }

    pub async fn get_article(&self, id: ArticleId) -> Result<Article, ArticleServiceError> {
        Ok(self
            .client
            .fetch_data(ApiRequest::get(format!("/articles/{id}")))
            .await?)
    }

    pub async fn create_article(
        &self,
        draft: &ArticleDraft,
    ) -> Result<Article, ArticleServiceError> {
        validate_draft(draft)?;
        let request = ApiRequest::post("/articles").with_json(draft)?;
        Ok(self.client.fetch_data(request).await?)
    }

    pub async fn update_article(
        &self,
        id: ArticleId,
        draft: &ArticleDraft,
    ) -> Result<Article, ArticleServiceError> {
        validate_draft(draft)?;
        let request = ApiRequest::put(format!("/articles/{id}")).with_json(draft)?;
        Ok(self.client.fetch_data(request).await?)
    }

    pub async fn delete_article(&self, id: ArticleId) -> Result<(), ArticleServiceError> {
        self.client
            .send_envelope::<serde_json::Value>(ApiRequest::delete(format!("/articles/{id}")))
            .await?;
        Ok(())
    }
}
