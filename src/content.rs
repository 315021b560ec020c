use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    client::{ApiClient, ApiError},
    models::{PublicContent, PublicContentListResponse},
};

/// Page requested when the listing route carries no `page` parameter.
pub const DEFAULT_PAGE: i64 = 1;
/// Page size requested when the listing route carries no `page_size` parameter.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// ContentApi Trait
///
/// The read-only contract for published content. Handlers and the page resolver only
/// see this trait, so the real backend client can be swapped for a mock in tests.
///
/// Neither operation retries or falls back; failures are logged by the implementation
/// and handed back unchanged.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Fetches exactly one item identified by (content-type slug, content slug).
    async fn get_content(
        &self,
        type_slug: &str,
        content_slug: &str,
    ) -> Result<PublicContent, ApiError>;

    /// Fetches one page of a content type's published items. `page` and `page_size`
    /// are forwarded verbatim; range checking belongs to the backend.
    async fn list_contents(
        &self,
        type_slug: &str,
        page: i64,
        page_size: i64,
    ) -> Result<PublicContentListResponse, ApiError>;
}

/// ContentState
///
/// Shared handle to the content facade inside the application state.
pub type ContentState = Arc<dyn ContentApi>;

/// PublicContentService
///
/// `ContentApi` over the backend's unauthenticated `/public/content` endpoints.
#[derive(Clone)]
pub struct PublicContentService {
    client: ApiClient,
}

impl PublicContentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentApi for PublicContentService {
    async fn get_content(
        &self,
        type_slug: &str,
        content_slug: &str,
    ) -> Result<PublicContent, ApiError> {
        let no_query: &[(&str, &str)] = &[];
        self.client
            .get_json(&["public", "content", type_slug, content_slug], no_query)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    type_slug,
                    content_slug,
                    error = %e,
                    "failed to fetch public content"
                );
            })
    }

    async fn list_contents(
        &self,
        type_slug: &str,
        page: i64,
        page_size: i64,
    ) -> Result<PublicContentListResponse, ApiError> {
        self.client
            .get_json(
                &["public", "content", type_slug],
                &[("page", page), ("page_size", page_size)],
            )
            .await
            .inspect_err(|e| {
                tracing::error!(
                    type_slug,
                    page,
                    page_size,
                    error = %e,
                    "failed to list public content"
                );
            })
    }
}
