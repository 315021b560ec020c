use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::models::{LoginRequest, RegisterRequest};

/// Shown when the backend rejects a login without saying why.
pub const LOGIN_FALLBACK_MESSAGE: &str =
    "Login failed. Please check your credentials and try again.";
/// Shown when the backend rejects a registration without saying why.
pub const REGISTER_FALLBACK_MESSAGE: &str = "Registration failed. Please try again.";

/// Field name → first validation message for that field.
pub type FieldErrors = BTreeMap<String, String>;

/// LoginForm
///
/// The login form as posted by the browser. Missing keys deserialize as empty strings so
/// that validation, not the extractor, reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
}

impl LoginForm {
    /// Trims the inputs, validates them, and yields the backend request.
    /// Nothing leaves the process when this returns `Err`.
    pub fn into_request(self) -> Result<LoginRequest, (Self, FieldErrors)> {
        let form = Self {
            email: self.email.trim().to_string(),
            password: self.password,
        };
        if let Err(e) = form.validate() {
            return Err((form, field_errors(&e)));
        }
        Ok(LoginRequest {
            email: form.email,
            password: form.password,
        })
    }
}

/// RegisterForm
///
/// The registration form as posted by the browser. A blank `full_name` counts as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(length(min = 3, message = "Username must be at least 3 characters."))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl RegisterForm {
    pub fn into_request(self) -> Result<RegisterRequest, (Self, FieldErrors)> {
        let form = Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
            full_name: self
                .full_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        };
        if let Err(e) = form.validate() {
            return Err((form, field_errors(&e)));
        }
        Ok(RegisterRequest {
            username: form.username,
            email: form.email,
            password: form.password,
            full_name: form.full_name,
        })
    }
}

/// Flattens `validator` output to one message per field.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{field} is invalid."));
            (field.to_string(), message)
        })
        .collect()
}
