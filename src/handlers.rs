use crate::{
    AppState, RendererState,
    auth::{AuthSession, LOGIN_PATH},
    client::ApiError,
    content::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE},
    error::AppResult,
    forms::{
        FieldErrors, LOGIN_FALLBACK_MESSAGE, LoginForm, REGISTER_FALLBACK_MESSAGE, RegisterForm,
    },
    models::AuthResponse,
    resolver::{PageOutcome, resolve_page},
};
use axum::{
    Form,
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

/// Where a successful login or registration lands.
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Shown when the backend accepted the credentials but its token could not become a session.
const SESSION_START_MESSAGE: &str = "Your session could not be started. Please sign in again.";

// --- Query Structs ---

/// ListQuery
///
/// Pagination parameters of the public listing page (GET /{type_slug}).
/// Missing values fall back to page 1 and 10 items; present values are forwarded as-is.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// --- Public Pages ---

/// home
///
/// [Public Route] Landing page.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Home page", content_type = "text/html"))
)]
pub async fn home(
    State(renderer): State<RendererState>,
    session: Session,
) -> AppResult<Html<String>> {
    let auth = AuthSession::load(&session).await;
    Ok(Html(renderer.render_home(auth.as_ref())?))
}

/// content_page
///
/// [Public Route] Renders one published item through the page resolver: the layout
/// renderer when the item carries a layout, the content type's template otherwise.
/// A missing item answers 404; any other backend failure answers 502.
#[utoipa::path(
    get,
    path = "/{type_slug}/{slug}",
    params(
        ("type_slug" = String, Path, description = "Content type slug"),
        ("slug" = String, Path, description = "Content slug"),
    ),
    responses(
        (status = 200, description = "Rendered content page", content_type = "text/html"),
        (status = 404, description = "No such content", content_type = "text/html"),
        (status = 502, description = "Backend unavailable", content_type = "text/html"),
    )
)]
pub async fn content_page(
    State(state): State<AppState>,
    session: Session,
    Path((type_slug, slug)): Path<(String, String)>,
    uri: Uri,
) -> AppResult<Response> {
    let auth = AuthSession::load(&session).await;

    let outcome = resolve_page(
        state.content.as_ref(),
        &state.renderer,
        &type_slug,
        &slug,
        auth.as_ref(),
    )
    .await?;

    match outcome {
        PageOutcome::Rendered(html) => Ok(Html(html).into_response()),
        PageOutcome::NotFound => not_found_page(&state.renderer, uri.path(), auth.as_ref()),
        PageOutcome::Unavailable => unavailable_page(&state.renderer, auth.as_ref()),
    }
}

/// list_page
///
/// [Public Route] Paginated listing of one content type's published items.
#[utoipa::path(
    get,
    path = "/{type_slug}",
    params(
        ("type_slug" = String, Path, description = "Content type slug"),
        ListQuery,
    ),
    responses(
        (status = 200, description = "Listing page", content_type = "text/html"),
        (status = 404, description = "Unknown content type", content_type = "text/html"),
        (status = 502, description = "Backend unavailable", content_type = "text/html"),
    )
)]
pub async fn list_page(
    State(state): State<AppState>,
    session: Session,
    Path(type_slug): Path<String>,
    Query(query): Query<ListQuery>,
    uri: Uri,
) -> AppResult<Response> {
    let auth = AuthSession::load(&session).await;
    let page = query.page.unwrap_or(DEFAULT_PAGE);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    match state.content.list_contents(&type_slug, page, page_size).await {
        Ok(listing) => {
            if !listing.is_consistent() {
                tracing::warn!(
                    %type_slug,
                    total = listing.total,
                    page_size = listing.page_size,
                    total_pages = listing.total_pages,
                    items = listing.items.len(),
                    "backend returned inconsistent pagination"
                );
            }
            let html = state
                .renderer
                .render_listing(&type_slug, &listing, auth.as_ref())?;
            Ok(Html(html).into_response())
        }
        Err(e) if e.is_not_found() => not_found_page(&state.renderer, uri.path(), auth.as_ref()),
        Err(_) => unavailable_page(&state.renderer, auth.as_ref()),
    }
}

/// not_found
///
/// Fallback for every unmatched route.
pub async fn not_found(
    State(renderer): State<RendererState>,
    session: Session,
    uri: Uri,
) -> AppResult<Response> {
    let auth = AuthSession::load(&session).await;
    not_found_page(&renderer, uri.path(), auth.as_ref())
}

fn not_found_page(
    renderer: &RendererState,
    path: &str,
    auth: Option<&AuthSession>,
) -> AppResult<Response> {
    let html = renderer.render_not_found(path, auth)?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

fn unavailable_page(renderer: &RendererState, auth: Option<&AuthSession>) -> AppResult<Response> {
    let html = renderer.render_unavailable(auth)?;
    Ok((StatusCode::BAD_GATEWAY, Html(html)).into_response())
}

// --- Login / Register / Logout ---

/// login_page
///
/// [Session Route] Login form. Already signed-in users go straight to the dashboard.
#[utoipa::path(
    get,
    path = "/auth/login",
    responses(
        (status = 200, description = "Login form", content_type = "text/html"),
        (status = 303, description = "Already signed in"),
    )
)]
pub async fn login_page(
    State(renderer): State<RendererState>,
    session: Session,
) -> AppResult<Response> {
    if AuthSession::load(&session).await.is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }
    let html = renderer.render_login(&LoginForm::default(), &FieldErrors::new(), None)?;
    Ok(Html(html).into_response())
}

/// login_submit
///
/// [Session Route] Validates the form locally, then asks the backend. Invalid input is
/// answered with 422 without any backend call. Backend rejections show the backend's
/// message, or a generic one when it sent none.
#[utoipa::path(
    post,
    path = "/auth/login",
    responses(
        (status = 303, description = "Signed in; redirect to the dashboard"),
        (status = 422, description = "Form validation failed", content_type = "text/html"),
        (status = 401, description = "Credentials rejected", content_type = "text/html"),
    )
)]
pub async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let request = match form.into_request() {
        Ok(request) => request,
        Err((form, errors)) => {
            tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "login form rejected");
            let html = state.renderer.render_login(&form, &errors, None)?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
        }
    };

    let retry_form = LoginForm {
        email: request.email.clone(),
        password: String::new(),
    };

    let (status, message) = match state.auth.login(request).await {
        Ok(response) => match begin_session(&state, &session, response).await? {
            Some(redirect) => return Ok(redirect),
            None => (StatusCode::BAD_GATEWAY, SESSION_START_MESSAGE.to_string()),
        },
        Err(e) => {
            tracing::warn!(email = %retry_form.email, error = %e, "login rejected");
            (
                failure_status(&e),
                e.server_message()
                    .unwrap_or(LOGIN_FALLBACK_MESSAGE)
                    .to_string(),
            )
        }
    };

    let html = state
        .renderer
        .render_login(&retry_form, &FieldErrors::new(), Some(&message))?;
    Ok((status, Html(html)).into_response())
}

/// register_page
///
/// [Session Route] Registration form.
#[utoipa::path(
    get,
    path = "/auth/register",
    responses(
        (status = 200, description = "Registration form", content_type = "text/html"),
        (status = 303, description = "Already signed in"),
    )
)]
pub async fn register_page(
    State(renderer): State<RendererState>,
    session: Session,
) -> AppResult<Response> {
    if AuthSession::load(&session).await.is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }
    let html = renderer.render_register(&RegisterForm::default(), &FieldErrors::new(), None)?;
    Ok(Html(html).into_response())
}

/// register_submit
///
/// [Session Route] Same flow as login: local validation first (username of at least
/// 3 characters, valid email, password of at least 6; full name optional), then the backend.
#[utoipa::path(
    post,
    path = "/auth/register",
    responses(
        (status = 303, description = "Registered and signed in; redirect to the dashboard"),
        (status = 422, description = "Form validation failed", content_type = "text/html"),
        (status = 400, description = "Registration rejected", content_type = "text/html"),
    )
)]
pub async fn register_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let request = match form.into_request() {
        Ok(request) => request,
        Err((form, errors)) => {
            tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "register form rejected");
            let html = state.renderer.render_register(&form, &errors, None)?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
        }
    };

    let retry_form = RegisterForm {
        username: request.username.clone(),
        email: request.email.clone(),
        password: String::new(),
        full_name: request.full_name.clone(),
    };

    let (status, message) = match state.auth.register(request).await {
        Ok(response) => match begin_session(&state, &session, response).await? {
            Some(redirect) => return Ok(redirect),
            None => (StatusCode::BAD_GATEWAY, SESSION_START_MESSAGE.to_string()),
        },
        Err(e) => {
            tracing::warn!(username = %retry_form.username, error = %e, "registration rejected");
            (
                failure_status(&e),
                e.server_message()
                    .unwrap_or(REGISTER_FALLBACK_MESSAGE)
                    .to_string(),
            )
        }
    };

    let html = state
        .renderer
        .render_register(&retry_form, &FieldErrors::new(), Some(&message))?;
    Ok((status, Html(html)).into_response())
}

/// logout
///
/// [Session Route] Ends the auth session and returns to the login form.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 303, description = "Signed out; redirect to the login form"))
)]
pub async fn logout(session: Session) -> AppResult<Redirect> {
    AuthSession::end(&session).await?;
    Ok(Redirect::to(LOGIN_PATH))
}

/// Turns a backend auth response into a live session. `None` means the token was unusable.
async fn begin_session(
    state: &AppState,
    session: &Session,
    response: AuthResponse,
) -> AppResult<Option<Response>> {
    let auth = match AuthSession::from_login(response, state.config.jwt_secret.as_deref()) {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(error = %e, "could not start session from backend token");
            return Ok(None);
        }
    };

    auth.start(session).await?;
    tracing::info!(user = %auth.user.username, "signed in");
    Ok(Some(Redirect::to(DASHBOARD_PATH).into_response()))
}

/// Client errors keep the backend's status; everything else is a gateway failure.
fn failure_status(e: &ApiError) -> StatusCode {
    match e {
        ApiError::Status { status, .. } if status.is_client_error() => *status,
        _ => StatusCode::BAD_GATEWAY,
    }
}

// --- Admin Pages ---

/// admin_index
///
/// [Admin Route] `/admin` itself points at the dashboard.
pub async fn admin_index() -> Redirect {
    Redirect::to(DASHBOARD_PATH)
}

/// dashboard
///
/// [Admin Route] Summary of the signed-in user and the session.
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard", content_type = "text/html"),
        (status = 303, description = "Not signed in; redirect to the login form"),
    )
)]
pub async fn dashboard(
    auth: AuthSession,
    State(renderer): State<RendererState>,
) -> AppResult<Html<String>> {
    Ok(Html(renderer.render_dashboard(&auth)?))
}

/// template_manager
///
/// [Admin Route] Read-only view of the templates the renderer knows about.
#[utoipa::path(
    get,
    path = "/admin/templates",
    responses(
        (status = 200, description = "Template manager", content_type = "text/html"),
        (status = 303, description = "Not signed in; redirect to the login form"),
    )
)]
pub async fn template_manager(
    auth: AuthSession,
    State(renderer): State<RendererState>,
) -> AppResult<Html<String>> {
    Ok(Html(renderer.render_template_manager(&auth)?))
}
