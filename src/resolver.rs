use serde_json::Value;

use crate::{
    auth::AuthSession,
    content::ContentApi,
    layout::is_truthy,
    models::PublicContent,
    render::PageRenderer,
};

/// RenderStrategy
///
/// The two ways a content item becomes a page.
#[derive(Debug, PartialEq)]
pub enum RenderStrategy<'a> {
    /// `content.layout` is present and truthy: compose the page from it.
    Layout(&'a Value),
    /// Otherwise: the template registered for the item's content type.
    Template,
}

/// Chooses the renderer for an item.
pub fn select_strategy(content: &PublicContent) -> RenderStrategy<'_> {
    match content.content.get("layout") {
        Some(layout) if is_truthy(layout) => RenderStrategy::Layout(layout),
        _ => RenderStrategy::Template,
    }
}

/// PageOutcome
///
/// Result of resolving one `/{type}/{slug}` request.
#[derive(Debug)]
pub enum PageOutcome {
    Rendered(String),
    /// The backend has no such item.
    NotFound,
    /// The backend could not be reached or failed; the page cannot be produced right now.
    Unavailable,
}

/// resolve_page
///
/// Fetches the item once and dispatches it to the layout or template renderer.
/// Fetch failures are classified rather than surfaced: not-found and every other
/// backend failure map to distinct outcomes. Only rendering errors are returned as `Err`.
pub async fn resolve_page(
    api: &dyn ContentApi,
    renderer: &PageRenderer,
    type_slug: &str,
    content_slug: &str,
    auth: Option<&AuthSession>,
) -> Result<PageOutcome, tera::Error> {
    let content = match api.get_content(type_slug, content_slug).await {
        Ok(content) => content,
        Err(e) if e.is_not_found() => return Ok(PageOutcome::NotFound),
        Err(_) => return Ok(PageOutcome::Unavailable),
    };

    let html = match select_strategy(&content) {
        RenderStrategy::Layout(layout) => renderer.render_layout_page(&content, layout, auth)?,
        RenderStrategy::Template => renderer.render_template_page(&content, auth)?,
    };

    Ok(PageOutcome::Rendered(html))
}
