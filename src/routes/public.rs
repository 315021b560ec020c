use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Unauthenticated, read-only pages. Content is fetched from the backend's public
/// endpoints on every request; nothing is cached between requests.
///
/// The static `/health` route takes priority over the `/{type_slug}` parameter route.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers. Does not touch the backend.
        .route("/health", get(|| async { "ok" }))
        // GET /
        .route("/", get(handlers::home))
        // GET /{type_slug}?page=..&page_size=..
        // Paginated listing of one content type. Pagination values reach the backend verbatim.
        .route("/{type_slug}", get(handlers::list_page))
        // GET /{type_slug}/{slug}
        // One published item, rendered by the page resolver (layout or template renderer).
        .route("/{type_slug}/{slug}", get(handlers::content_page))
}
