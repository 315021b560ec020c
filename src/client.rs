use reqwest::{StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// ApiError
///
/// Every failure a backend call can produce. Kinds are kept apart so callers can tell a
/// missing item from a broken backend without inspecting transport internals.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL `{0}`")]
    InvalidBaseUrl(String),

    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend responded with {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
}

impl ApiError {
    /// True when the backend reported that the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// The human-readable message the backend attached to an error response, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// ApiClient
///
/// The single pre-configured HTTP client used for every backend call. It owns one
/// `reqwest::Client` (connection pool) and the parsed base URL; endpoints are built by
/// appending percent-encoded path segments so that a base path such as `/api` survives.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// new
    ///
    /// Parses the base URL once. URLs that cannot carry path segments (e.g. `mailto:`)
    /// are rejected here rather than on the first request.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let parsed =
            Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `{base}/{segment}/{segment}...`, encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Unauthenticated GET returning a decoded JSON body.
    pub async fn get_json<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "GET backend");

        let response = self.http.get(url).query(query).send().await?;
        Self::decode(response).await
    }

    /// POST with a JSON body, returning a decoded JSON body.
    pub async fn post_json<T, B>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "POST backend");

        let response = self.http.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        // Error bodies are best effort: a non-JSON body just means no message.
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| error_message(&body));

        Err(ApiError::Status { status, message })
    }
}

/// Extracts the message from a backend error body (`message`, `error`, then `detail`).
pub fn error_message(body: &Value) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|value| value.as_str().filter(|s| !s.trim().is_empty()))
        .map(str::to_string)
}
