use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Session Router Module
///
/// The forms that create and end an `AuthSession`. Submissions are validated locally
/// before the backend sees them.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /auth/login
        .route(
            "/auth/login",
            get(handlers::login_page).post(handlers::login_submit),
        )
        // GET/POST /auth/register
        .route(
            "/auth/register",
            get(handlers::register_page).post(handlers::register_submit),
        )
        // POST /auth/logout
        // Flushes the session; the browser lands on the login form.
        .route("/auth/logout", post(handlers::logout))
}
