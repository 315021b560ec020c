use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Pages of the admin area, nested under `/admin`. The router is wrapped in a route layer
/// that extracts `AuthSession`, so requests without a live session are redirected to the
/// login form before any handler runs. The handlers also take `AuthSession` themselves to
/// render the signed-in user.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        .route("/", get(handlers::admin_index))
        // GET /admin/dashboard
        .route("/dashboard", get(handlers::dashboard))
        // GET /admin/templates
        // Read-only list of the content templates and layout blocks the renderer has loaded.
        .route("/templates", get(handlers::template_manager))
}
