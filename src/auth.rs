use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, dangerous::insecure_decode, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_sessions::Session;

use crate::{
    client::{ApiClient, ApiError},
    models::{AuthResponse, LoginRequest, RegisterRequest, UserProfile},
};

/// Session key the auth context is stored under.
const SESSION_KEY: &str = "auth";

/// Where unauthenticated admin requests are sent.
pub const LOGIN_PATH: &str = "/auth/login";

// --- Backend Auth API ---

/// AuthApi Trait
///
/// The backend's credential-checking operations. Only the login/register handlers call
/// it, and only after the submitted form passed validation.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, req: LoginRequest) -> Result<AuthResponse, ApiError>;
    async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, ApiError>;
}

/// AuthState
///
/// Shared handle to the auth API inside the application state.
pub type AuthState = Arc<dyn AuthApi>;

/// AuthService
///
/// `AuthApi` over the backend's `/auth/login` and `/auth/register` endpoints.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthApi for AuthService {
    async fn login(&self, req: LoginRequest) -> Result<AuthResponse, ApiError> {
        self.client.post_json(&["auth", "login"], &req).await
    }

    async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.client.post_json(&["auth", "register"], &req).await
    }
}

// --- Session Context ---

/// Claims
///
/// The subset of the backend token's claims the frontend reads. Only `exp` matters:
/// it bounds the lifetime of the session built from the token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: i64,
}

/// AuthError
///
/// Reasons a backend login response cannot become a session.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("session token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("session token has already expired")]
    Expired,
}

/// AuthSession
///
/// The authentication context of one browser session. It is created from a successful
/// login/register, stored server-side in the session store, and passed explicitly to the
/// pages that need it. It ends on logout or once `expires_at` has passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// from_login
    ///
    /// Builds the context from the backend response. The expiry comes from the token's
    /// `exp` claim; with `secret` configured the signature is verified as well. Tokens that
    /// are not JWTs are accepted as opaque and fall back to the response's `expires_at`.
    pub fn from_login(response: AuthResponse, secret: Option<&str>) -> Result<Self, AuthError> {
        let token_expiry = token_expiry(&response.token, secret)?;
        let expires_at = token_expiry.or(response.expires_at);

        let session = Self {
            token: response.token,
            user: response.user,
            expires_at,
        };

        if session.is_expired(Utc::now()) {
            return Err(AuthError::Expired);
        }
        Ok(session)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }

    /// Stores the context, rotating the session id to prevent fixation.
    pub async fn start(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.cycle_id().await?;
        session.insert(SESSION_KEY, self).await
    }

    /// Returns the live context of this session. Expired contexts are flushed.
    pub async fn load(session: &Session) -> Option<Self> {
        let auth = session
            .get::<AuthSession>(SESSION_KEY)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to read auth session"))
            .ok()
            .flatten()?;

        if auth.is_expired(Utc::now()) {
            tracing::info!(user = %auth.user.username, "auth session expired");
            if let Err(e) = session.flush().await {
                tracing::warn!(error = %e, "failed to flush expired session");
            }
            return None;
        }

        Some(auth)
    }

    /// Ends the session (logout).
    pub async fn end(session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.flush().await
    }
}

fn token_expiry(token: &str, secret: Option<&str>) -> Result<Option<DateTime<Utc>>, AuthError> {
    let claims = match secret {
        Some(secret) => {
            let mut validation = Validation::default();
            validation.validate_exp = true;
            decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?
                .claims
        }
        // Without the backend secret the claims are only read, never trusted for identity.
        None => match insecure_decode::<Claims>(token) {
            Ok(data) => data.claims,
            Err(_) => return Ok(None),
        },
    };

    Ok(DateTime::from_timestamp(claims.exp, 0))
}

/// AuthSession Extractor Implementation
///
/// Makes `AuthSession` usable as a handler argument. Requests without a live session are
/// rejected with a redirect to the login page instead of reaching the handler.
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to(LOGIN_PATH))?;

        AuthSession::load(&session)
            .await
            .ok_or(Redirect::to(LOGIN_PATH))
    }
}
