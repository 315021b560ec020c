use std::path::Path;

use cms_frontend::{
    PageRenderer,
    forms::{LoginForm, RegisterForm},
    layout::{LayoutRenderer, MAX_DEPTH, is_truthy, sanitize_name},
    models::{PublicContent, PublicContentListResponse, PublicFieldInfo, UserProfile},
    render::{DEFAULT_CONTENT_TEMPLATE, render_fields},
    resolver::{RenderStrategy, select_strategy},
};
use serde_json::{Value, json};
use tera::Tera;
use uuid::Uuid;

fn renderer() -> PageRenderer {
    PageRenderer::new(&Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")).unwrap()
}

fn item(type_slug: &str, content: Value) -> PublicContent {
    PublicContent {
        content_type_slug: type_slug.to_string(),
        title: "Item".to_string(),
        slug: "item".to_string(),
        content,
        ..PublicContent::default()
    }
}

fn field(slug: &str, field_type: &str) -> PublicFieldInfo {
    PublicFieldInfo {
        id: Uuid::new_v4(),
        name: slug.to_uppercase(),
        slug: slug.to_string(),
        field_type: field_type.to_string(),
        ui_config: None,
    }
}

// --- Form Validation ---

#[test]
fn test_login_form_valid() {
    let form = LoginForm {
        email: "  ada@example.com ".to_string(),
        password: "secret".to_string(),
    };
    let request = form.into_request().unwrap();
    assert_eq!(request.email, "ada@example.com");
    assert_eq!(request.password, "secret");
}

#[test]
fn test_login_form_rejects_bad_email_and_short_password() {
    let form = LoginForm {
        email: "ada.example.com".to_string(),
        password: "12345".to_string(),
    };
    let (_, errors) = form.into_request().unwrap_err();
    assert_eq!(errors["email"], "Please enter a valid email address.");
    assert_eq!(errors["password"], "Password must be at least 6 characters.");
}

#[test]
fn test_login_form_rejects_empty_fields() {
    let (_, errors) = LoginForm::default().into_request().unwrap_err();
    assert!(errors.contains_key("email"));
    assert!(errors.contains_key("password"));
}

#[test]
fn test_register_form_username_minimum() {
    let form = RegisterForm {
        username: "ab".to_string(),
        email: "ada@example.com".to_string(),
        password: "secret1".to_string(),
        full_name: None,
    };
    let (returned, errors) = form.into_request().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors["username"], "Username must be at least 3 characters.");
    assert_eq!(returned.email, "ada@example.com");
}

#[test]
fn test_register_form_blank_full_name_is_absent() {
    let form = RegisterForm {
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        password: "secret1".to_string(),
        full_name: Some("   ".to_string()),
    };
    let request = form.into_request().unwrap();
    assert_eq!(request.full_name, None);

    let json = serde_json::to_value(&request).unwrap();
    assert!(json.get("full_name").is_none());
}

#[test]
fn test_register_form_keeps_full_name() {
    let form = RegisterForm {
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        password: "secret1".to_string(),
        full_name: Some(" Ada Lovelace ".to_string()),
    };
    let request = form.into_request().unwrap();
    assert_eq!(request.full_name.as_deref(), Some("Ada Lovelace"));
}

// --- Models ---

#[test]
fn test_expected_total_pages() {
    assert_eq!(PublicContentListResponse::expected_total_pages(0, 10), 0);
    assert_eq!(PublicContentListResponse::expected_total_pages(1, 10), 1);
    assert_eq!(PublicContentListResponse::expected_total_pages(10, 10), 1);
    assert_eq!(PublicContentListResponse::expected_total_pages(11, 10), 2);
    assert_eq!(PublicContentListResponse::expected_total_pages(5, 0), 0);
}

#[test]
fn test_expected_total_pages_handles_huge_totals() {
    assert_eq!(
        PublicContentListResponse::expected_total_pages(i64::MAX, 10),
        i64::MAX / 10 + 1
    );
    assert_eq!(PublicContentListResponse::expected_total_pages(i64::MAX, 1), i64::MAX);

    let listing = PublicContentListResponse {
        total: i64::MAX - 3,
        page: 1,
        page_size: 10,
        total_pages: 1,
        ..Default::default()
    };
    assert!(!listing.is_consistent());
}

#[test]
fn test_listing_navigation_flags() {
    let listing = PublicContentListResponse {
        total: 25,
        page: 2,
        page_size: 10,
        total_pages: 3,
        ..Default::default()
    };
    assert!(listing.is_consistent());
    assert!(listing.has_previous());
    assert!(listing.has_next());

    let last = PublicContentListResponse { page: 3, ..listing.clone() };
    assert!(!last.has_next());

    let wrong = PublicContentListResponse { total_pages: 7, ..listing };
    assert!(!wrong.is_consistent());
}

#[test]
fn test_display_name_prefers_full_name() {
    let mut user = UserProfile {
        username: "ada".to_string(),
        full_name: Some("Ada Lovelace".to_string()),
        ..Default::default()
    };
    assert_eq!(user.display_name(), "Ada Lovelace");
    user.full_name = Some(" ".to_string());
    assert_eq!(user.display_name(), "ada");
}

// --- Strategy Selection ---

#[test]
fn test_truthiness() {
    for falsy in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
        assert!(!is_truthy(&falsy), "{falsy} should be falsy");
    }
    for truthy in [json!(true), json!(1), json!("x"), json!([1]), json!({ "a": 1 })] {
        assert!(is_truthy(&truthy), "{truthy} should be truthy");
    }
}

#[test]
fn test_select_strategy() {
    let layout = json!([{ "type": "text", "props": { "text": "hi" } }]);
    let with_layout = item("page", json!({ "layout": layout }));
    assert_eq!(select_strategy(&with_layout), RenderStrategy::Layout(&layout));

    for content in [json!({}), json!(null), json!({ "layout": null }), json!({ "layout": [] })] {
        assert_eq!(select_strategy(&item("page", content)), RenderStrategy::Template);
    }
}

#[test]
fn test_content_suggestions_order() {
    let mut content = item("Blog Post", json!({}));
    content.content_type_ui_config = Some(json!({ "template": "../Feature" }));

    assert_eq!(
        PageRenderer::content_suggestions(&content),
        vec![
            "content/feature.html".to_string(),
            "content/blogpost.html".to_string(),
            DEFAULT_CONTENT_TEMPLATE.to_string(),
        ]
    );
}

#[test]
fn test_resolve_template_skips_missing() {
    let renderer = renderer();
    let suggestions = PageRenderer::content_suggestions(&item("recipe", json!({})));
    assert_eq!(
        renderer.resolve_template(&suggestions).as_deref(),
        Some(DEFAULT_CONTENT_TEMPLATE)
    );
    let suggestions = PageRenderer::content_suggestions(&item("blog", json!({})));
    assert_eq!(
        renderer.resolve_template(&suggestions).as_deref(),
        Some("content/blog.html")
    );
}

#[test]
fn test_sanitize_name() {
    assert_eq!(sanitize_name(" Hero_Banner-2 "), "hero_banner-2");
    assert_eq!(sanitize_name("../../etc/passwd"), "etcpasswd");
}

// --- Layout Renderer ---

#[test]
fn test_layout_builtins_escape_text() {
    let tera = Tera::default();
    let html = LayoutRenderer::new(&tera)
        .render(&json!([
            { "type": "heading", "props": { "text": "<b>Hi</b>", "level": 9 } },
            { "type": "paragraph", "props": { "text": "a & b" } }
        ]))
        .unwrap();

    assert_eq!(html, "<h6>&lt;b&gt;Hi&lt;&#x2F;b&gt;</h6><p>a &amp; b</p>");
}

#[test]
fn test_layout_page_root_and_children() {
    let tera = Tera::default();
    let html = LayoutRenderer::new(&tera)
        .render(&json!({
            "root": {},
            "content": [{
                "type": "Section",
                "children": [{ "type": "text", "props": { "text": "inner" } }]
            }]
        }))
        .unwrap();

    assert_eq!(html, "<div class=\"layout-section\"><p>inner</p></div>");
}

#[test]
fn test_layout_unknown_block_and_children_in_props() {
    let tera = Tera::default();
    let html = LayoutRenderer::new(&tera)
        .render(&json!({
            "type": "callout",
            "props": { "children": [{ "type": "text", "props": { "text": "x" } }] }
        }))
        .unwrap();

    assert_eq!(html, "<div class=\"block block--callout\"><p>x</p></div>");
}

#[test]
fn test_layout_image_rejects_script_urls() {
    let tera = Tera::default();
    let renderer = LayoutRenderer::new(&tera);

    let html = renderer
        .render(&json!({ "type": "image", "props": { "src": "javascript:alert(1)", "alt": "x" } }))
        .unwrap();
    assert_eq!(html, "<img src=\"\" alt=\"x\" />");

    let html = renderer
        .render(&json!({ "type": "image", "props": { "src": "/media/a.png" } }))
        .unwrap();
    assert!(html.contains("src=\"&#x2F;media&#x2F;a.png\""));
}

#[test]
fn test_layout_html_block_is_sanitized() {
    let tera = Tera::default();
    let html = LayoutRenderer::new(&tera)
        .render(&json!({
            "type": "html",
            "props": { "html": "<p>ok</p><script>alert(1)</script>" }
        }))
        .unwrap();
    assert_eq!(html, "<p>ok</p>");
}

#[test]
fn test_layout_depth_limit() {
    let mut node = json!({ "type": "text", "props": { "text": "deep" } });
    for _ in 0..(MAX_DEPTH * 2) {
        node = json!({ "type": "container", "children": [node] });
    }
    let tera = Tera::default();

    let html = LayoutRenderer::new(&tera).render(&node).unwrap();

    assert!(html.starts_with("<div class=\"layout-container\">"));
    assert!(!html.contains("deep"));
}

#[test]
fn test_layout_block_template_receives_props() {
    let renderer = renderer();
    let html = LayoutRenderer::new(renderer.tera())
        .render(&json!({
            "type": "hero",
            "props": { "title": "Launch", "subtitle": "Soon" },
            "children": [{ "type": "text", "props": { "text": "below" } }]
        }))
        .unwrap();

    assert!(html.contains("<section class=\"hero\">"));
    assert!(html.contains("<h1>Launch</h1>"));
    assert!(html.contains("Soon"));
    assert!(html.contains("<p>below</p>"));
}

// --- Field Rendering ---

#[test]
fn test_render_fields_in_descriptor_order() {
    let mut content = item(
        "blog",
        json!({
            "body": "<p>Hi</p><script>x()</script>",
            "intro": "**bold**",
            "count": 3,
            "tags": ["a", "b"],
            "empty": null
        }),
    );
    content.fields = vec![
        field("intro", "markdown"),
        field("body", "richtext"),
        field("missing", "text"),
        field("empty", "text"),
        field("count", "number"),
        field("tags", "list"),
    ];

    let fields = render_fields(&content);
    let slugs: Vec<&str> = fields.iter().map(|f| f.slug.as_str()).collect();
    assert_eq!(slugs, ["intro", "body", "count", "tags"]);

    assert_eq!(fields[0].html.as_deref(), Some("<p><strong>bold</strong></p>\n"));
    assert_eq!(fields[1].html.as_deref(), Some("<p>Hi</p>"));
    assert_eq!(fields[2].text, "3");
    assert_eq!(fields[2].html, None);
    assert_eq!(fields[3].text, "a, b");
}
