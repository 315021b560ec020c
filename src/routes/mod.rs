//! Router Module Index
//!
//! Organizes the page routes by access level. Access control is applied at the module
//! level (via Axum layers in `create_router`), so a page cannot end up public by accident.

/// Pages anyone can read: home, content listings and content pages.
pub mod public;

/// Login, registration and logout. Reachable without a session.
pub mod session;

/// The admin area. Every route requires a live `AuthSession`.
pub mod admin;
