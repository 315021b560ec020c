use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Public Content Schemas (Backend Responses) ---

/// PublicFieldInfo
///
/// Describes one field of the content type an item belongs to. The order of the
/// descriptors in [`PublicContent::fields`] is the order the template renderer shows them in.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PublicFieldInfo {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    // Backend field-type tag, e.g. "text", "richtext", "markdown", "number".
    pub field_type: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    #[ts(type = "unknown")]
    pub ui_config: Option<Value>,
}

/// PublicContent
///
/// One published content item as returned by `GET /public/content/{type}/{slug}`.
/// `content` and `metadata` are schema-less documents: the rendering strategy branches
/// on their shape at runtime (`content.layout`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PublicContent {
    pub id: Uuid,
    pub content_type_id: Uuid,
    pub content_type_slug: String,
    #[serde(default)]
    pub content_type_name: Option<String>,
    // May carry `template`, the preferred template of the content type.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    #[ts(type = "unknown")]
    pub content_type_ui_config: Option<Value>,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    #[ts(type = "unknown")]
    pub content: Value,
    #[serde(default)]
    #[schema(value_type = Object)]
    #[ts(type = "unknown")]
    pub metadata: Value,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fields: Vec<PublicFieldInfo>,
}

impl PublicContent {
    /// The template requested by the content type's UI configuration, if any.
    pub fn ui_template(&self) -> Option<&str> {
        self.content_type_ui_config
            .as_ref()
            .and_then(|config| config.get("template"))
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
    }
}

/// PublicContentListItem
///
/// Summary row of the paginated listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PublicContentListItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[schema(value_type = Object)]
    #[ts(type = "unknown")]
    pub metadata: Value,
}

/// PublicContentListResponse
///
/// One page of a content type's published items plus the pagination counters.
/// Values are taken verbatim from the backend; see [`Self::is_consistent`].
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PublicContentListResponse {
    pub items: Vec<PublicContentListItem>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl PublicContentListResponse {
    /// `ceil(total / page_size)`; zero when either value is not positive.
    /// Safe for any `total` the backend sends.
    pub fn expected_total_pages(total: i64, page_size: i64) -> i64 {
        if page_size <= 0 || total <= 0 {
            return 0;
        }
        (total - 1) / page_size + 1
    }

    /// Checks the pagination invariants the backend is expected to honour.
    pub fn is_consistent(&self) -> bool {
        self.total_pages == Self::expected_total_pages(self.total, self.page_size)
            && self.items.len() as i64 <= self.page_size.max(0)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

// --- Auth Payloads (Backend Requests/Responses) ---

/// LoginRequest
///
/// Body of `POST /auth/login`. Built only from an already validated form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// RegisterRequest
///
/// Body of `POST /auth/register`. `full_name` is omitted from the JSON when absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub full_name: Option<String>,
}

/// UserProfile
///
/// The identity the backend returns on login/register.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl UserProfile {
    /// Name shown in the page chrome.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// AuthResponse
///
/// Successful login/register response. Some backends call the token `access_token`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: UserProfile,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub expires_at: Option<DateTime<Utc>>,
}
