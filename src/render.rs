//! Page renderer backed by Tera templates.
//!
//! Template names follow the layout of the templates directory:
//! `base.html`, `home.html`, `listing.html`, `content/*.html` (template renderer),
//! `layout/*.html` (layout blocks), `layout_page.html`, `errors/*.html`,
//! `auth/*.html` and `admin/*.html`.

use std::path::Path;

use pulldown_cmark::{Parser, html};
use serde::Serialize;
use serde_json::Value;
use tera::{Context, Tera};

use crate::{
    auth::AuthSession,
    forms::{FieldErrors, LoginForm, RegisterForm},
    layout::{LayoutRenderer, sanitize_name},
    models::{PublicContent, PublicContentListResponse},
};

/// Template used when neither the content type nor its UI config names one.
pub const DEFAULT_CONTENT_TEMPLATE: &str = "content/default.html";

/// RenderedField
///
/// A content field flattened for templates: `text` for plain values, `html` (already
/// sanitized) for rich text and markdown.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenderedField {
    pub name: String,
    pub slug: String,
    pub field_type: String,
    pub text: String,
    pub html: Option<String>,
}

/// PageRenderer
///
/// Owns the Tera instance and every page the frontend can produce.
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    /// Loads `**/*.html` below `template_dir`. An empty directory is an error: every page
    /// depends on `base.html`.
    pub fn new(template_dir: &Path) -> Result<Self, tera::Error> {
        let pattern = template_dir.join("**/*.html");
        let pattern = pattern
            .to_str()
            .ok_or_else(|| tera::Error::msg("template directory is not valid UTF-8"))?;

        let tera = Tera::new(pattern)?;
        if tera.get_template_names().next().is_none() {
            return Err(tera::Error::msg(format!("no templates found in {pattern}")));
        }
        tracing::debug!(count = tera.get_template_names().count(), "loaded templates");

        Ok(Self { tera })
    }

    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// All loaded template names, sorted.
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tera.get_template_names().map(str::to_string).collect();
        names.sort();
        names
    }

    /// Template keys usable by the template renderer (`content/{key}.html`).
    pub fn content_templates(&self) -> Vec<String> {
        self.names_under("content/")
    }

    /// Block types with a dedicated layout template (`layout/{type}.html`).
    pub fn layout_blocks(&self) -> Vec<String> {
        self.names_under("layout/")
    }

    fn names_under(&self, prefix: &str) -> Vec<String> {
        self.template_names()
            .iter()
            .filter_map(|name| name.strip_prefix(prefix))
            .filter_map(|name| name.strip_suffix(".html"))
            .map(str::to_string)
            .collect()
    }

    /// Template suggestions for an item, most specific first:
    /// the UI-configured template, the content type's template, the default.
    pub fn content_suggestions(content: &PublicContent) -> Vec<String> {
        let mut suggestions = Vec::with_capacity(3);
        if let Some(name) = content.ui_template().map(sanitize_name) {
            if !name.is_empty() {
                suggestions.push(format!("content/{name}.html"));
            }
        }
        let type_name = sanitize_name(&content.content_type_slug);
        if !type_name.is_empty() {
            suggestions.push(format!("content/{type_name}.html"));
        }
        suggestions.push(DEFAULT_CONTENT_TEMPLATE.to_string());
        suggestions
    }

    /// First suggestion that exists.
    pub fn resolve_template(&self, suggestions: &[String]) -> Option<String> {
        suggestions
            .iter()
            .find(|name| self.tera.get_template(name).is_ok())
            .cloned()
    }

    // --- Content Pages ---

    /// Template renderer: picks the template for the item's content type.
    pub fn render_template_page(
        &self,
        content: &PublicContent,
        auth: Option<&AuthSession>,
    ) -> Result<String, tera::Error> {
        let suggestions = Self::content_suggestions(content);
        let template = self
            .resolve_template(&suggestions)
            .unwrap_or_else(|| DEFAULT_CONTENT_TEMPLATE.to_string());
        tracing::debug!(%template, slug = %content.slug, "rendering with template renderer");

        let mut context = page_context(auth);
        context.insert("content", content);
        context.insert("fields", &render_fields(content));
        context.insert("template_name", &template);
        self.tera.render(&template, &context)
    }

    /// Layout renderer: composes the page from the item's layout document.
    pub fn render_layout_page(
        &self,
        content: &PublicContent,
        layout: &Value,
        auth: Option<&AuthSession>,
    ) -> Result<String, tera::Error> {
        tracing::debug!(slug = %content.slug, "rendering with layout renderer");
        let body = LayoutRenderer::new(&self.tera).render(layout)?;

        let mut context = page_context(auth);
        context.insert("content", content);
        context.insert("layout_html", &body);
        context.insert("page_data", &page_data(content)?);
        self.tera.render("layout_page.html", &context)
    }

    pub fn render_listing(
        &self,
        type_slug: &str,
        listing: &PublicContentListResponse,
        auth: Option<&AuthSession>,
    ) -> Result<String, tera::Error> {
        let mut context = page_context(auth);
        context.insert("type_slug", type_slug);
        context.insert("listing", listing);
        context.insert("has_previous", &listing.has_previous());
        context.insert("has_next", &listing.has_next());
        self.tera.render("listing.html", &context)
    }

    pub fn render_home(&self, auth: Option<&AuthSession>) -> Result<String, tera::Error> {
        self.tera.render("home.html", &page_context(auth))
    }

    // --- Error Pages ---

    pub fn render_not_found(
        &self,
        path: &str,
        auth: Option<&AuthSession>,
    ) -> Result<String, tera::Error> {
        let mut context = page_context(auth);
        context.insert("path", path);
        self.tera.render("errors/not_found.html", &context)
    }

    pub fn render_unavailable(&self, auth: Option<&AuthSession>) -> Result<String, tera::Error> {
        self.tera.render("errors/unavailable.html", &page_context(auth))
    }

    // --- Auth Forms ---

    pub fn render_login(
        &self,
        form: &LoginForm,
        errors: &FieldErrors,
        message: Option<&str>,
    ) -> Result<String, tera::Error> {
        let mut context = page_context(None);
        // The password is never echoed back.
        context.insert("email", &form.email);
        context.insert("errors", errors);
        context.insert("message", &message);
        self.tera.render("auth/login.html", &context)
    }

    pub fn render_register(
        &self,
        form: &RegisterForm,
        errors: &FieldErrors,
        message: Option<&str>,
    ) -> Result<String, tera::Error> {
        let mut context = page_context(None);
        context.insert("username", &form.username);
        context.insert("email", &form.email);
        context.insert("full_name", &form.full_name);
        context.insert("errors", errors);
        context.insert("message", &message);
        self.tera.render("auth/register.html", &context)
    }

    // --- Admin Pages ---

    pub fn render_dashboard(&self, auth: &AuthSession) -> Result<String, tera::Error> {
        let mut context = page_context(Some(auth));
        context.insert("role", &auth.user.role);
        context.insert(
            "expires_at",
            &auth
                .expires_at
                .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string()),
        );
        context.insert("content_template_count", &self.content_templates().len());
        context.insert("layout_block_count", &self.layout_blocks().len());
        self.tera.render("admin/dashboard.html", &context)
    }

    pub fn render_template_manager(&self, auth: &AuthSession) -> Result<String, tera::Error> {
        let mut context = page_context(Some(auth));
        context.insert("content_templates", &self.content_templates());
        context.insert("layout_blocks", &self.layout_blocks());
        context.insert("default_template", DEFAULT_CONTENT_TEMPLATE);
        self.tera.render("admin/templates.html", &context)
    }
}

/// Context shared by every page: the optional auth session drives the navigation.
fn page_context(auth: Option<&AuthSession>) -> Context {
    let mut context = Context::new();
    context.insert("signed_in", &auth.is_some());
    if let Some(auth) = auth {
        context.insert("user", &auth.user);
        context.insert("display_name", auth.user.display_name());
    }
    context
}

/// Item JSON for client-side scripts, safe inside a `<script>` element.
fn page_data(content: &PublicContent) -> Result<String, tera::Error> {
    let json = serde_json::to_string(content).map_err(tera::Error::json)?;
    Ok(json.replace("</", "<\\/"))
}

/// Flattens the item's field values in descriptor order. Missing and null values are skipped.
pub fn render_fields(content: &PublicContent) -> Vec<RenderedField> {
    content
        .fields
        .iter()
        .filter_map(|field| {
            let value = content.content.get(&field.slug).filter(|v| !v.is_null())?;
            let (text, html) = match (field.field_type.as_str(), value.as_str()) {
                ("richtext" | "html", Some(raw)) => (String::new(), Some(ammonia::clean(raw))),
                ("markdown", Some(raw)) => (String::new(), Some(markdown_to_html(raw))),
                _ => (value_text(value), None),
            };
            Some(RenderedField {
                name: field.name.clone(),
                slug: field.slug.clone(),
                field_type: field.field_type.clone(),
                text,
                html,
            })
        })
        .collect()
}

fn markdown_to_html(source: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(source));
    ammonia::clean(&out)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}
