use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tower_sessions::{
    Expiry, SessionManagerLayer,
    cookie::{SameSite, time::Duration},
};
use tower_sessions_moka_store::MokaStore;
use tracing::{Level, Span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// --- Module Structure ---

// Backend access.
pub mod client;
pub mod content;

// Auth context, forms and the models exchanged with the backend.
pub mod auth;
pub mod forms;
pub mod models;

// Rendering pipeline.
pub mod layout;
pub mod render;
pub mod resolver;

// HTTP surface.
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;

use auth::AuthSession;
use routes::{admin, public, session};

// --- Public Re-exports ---

pub use auth::{AuthService, AuthState};
pub use client::{ApiClient, ApiError};
pub use config::{AppConfig, Env};
pub use content::{ContentState, PublicContentService};
pub use render::PageRenderer;

/// ApiDoc
///
/// OpenAPI description of the frontend's page routes. Served at `/api-docs/openapi.json`
/// and browsable through Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::home, handlers::list_page, handlers::content_page,
        handlers::login_page, handlers::login_submit, handlers::register_page,
        handlers::register_submit, handlers::logout, handlers::dashboard,
        handlers::template_manager
    ),
    components(
        schemas(
            models::PublicContent, models::PublicFieldInfo, models::PublicContentListItem,
            models::PublicContentListResponse, models::LoginRequest, models::RegisterRequest,
            models::AuthResponse, models::UserProfile, forms::LoginForm, forms::RegisterForm,
        )
    ),
    tags(
        (name = "cms-frontend", description = "Server-rendered CMS pages")
    )
)]
struct ApiDoc;

/// Shared handle to the page renderer.
pub type RendererState = Arc<PageRenderer>;

/// AppState
///
/// The single, immutable container of everything a request needs. Cloned per request;
/// the services behind it are shared trait objects.
#[derive(Clone)]
pub struct AppState {
    /// Public content facade over the backend.
    pub content: ContentState,
    /// Backend login/registration.
    pub auth: AuthState,
    /// Tera-backed page renderer.
    pub renderer: RendererState,
    /// The loaded configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Handlers pull only the components they use.

impl FromRef<AppState> for ContentState {
    fn from_ref(app_state: &AppState) -> ContentState {
        app_state.content.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(app_state: &AppState) -> AuthState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for RendererState {
    fn from_ref(app_state: &AppState) -> RendererState {
        app_state.renderer.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// require_session
///
/// Route layer guarding the admin area. Extracting `AuthSession` either yields the live
/// session or rejects with a redirect to the login form, so the handler never runs
/// unauthenticated.
async fn require_session(_auth: AuthSession, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// Upper bound on live sessions held in memory.
pub const SESSION_STORE_CAPACITY: u64 = 10_000;

/// session_store
///
/// In-memory session store. Records are evicted once their expiry date passes (or the
/// capacity is reached), so sessions abandoned without logout do not accumulate.
pub fn session_store() -> MokaStore {
    MokaStore::new(Some(SESSION_STORE_CAPACITY))
}

/// create_router
///
/// Assembles the page routes, the session layer and the observability layers.
pub fn create_router(state: AppState) -> Router {
    // 1. Session store: server-side, in memory, dropped after a period of inactivity.
    let session_layer = SessionManagerLayer::new(session_store())
        .with_secure(state.config.env == Env::Production)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            state.config.session_ttl_minutes,
        )));

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(session::session_routes())
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn(require_session)),
        )
        .fallback(handlers::not_found)
        .with_state(state);

    // 3. Session + Observability Layers (outermost last)
    base_router.layer(session_layer).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Span for every request, correlated by the `x-request-id` header.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
