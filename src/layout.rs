//! Layout renderer: turns the nested, backend-stored `content.layout` document into HTML.
//!
//! Accepted shapes:
//! - an array of blocks,
//! - a page root `{ "root": {..}, "content": [blocks] }`,
//! - a block `{ "type": "...", "props": {..}, "children": [blocks] }`.
//!
//! A block whose type has a `layout/{type}.html` template is rendered through it with
//! `props`, `block_type` and the already rendered `children`; otherwise one of the
//! built-in fallbacks below is used.

use serde_json::{Map, Value};
use tera::{Context, Tera};

/// Nesting beyond this depth is not rendered.
pub const MAX_DEPTH: usize = 32;

/// True when a layout value should drive rendering: absent, null, false, zero, empty
/// strings and empty containers do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Lowercases and strips everything but `[a-z0-9_-]`, for template names and CSS classes.
pub fn sanitize_name(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

pub struct LayoutRenderer<'a> {
    tera: &'a Tera,
}

impl<'a> LayoutRenderer<'a> {
    pub fn new(tera: &'a Tera) -> Self {
        Self { tera }
    }

    pub fn render(&self, layout: &Value) -> Result<String, tera::Error> {
        self.render_node(layout, 0)
    }

    fn render_node(&self, node: &Value, depth: usize) -> Result<String, tera::Error> {
        if depth > MAX_DEPTH {
            tracing::warn!(depth, "layout nested too deeply; skipping subtree");
            return Ok(String::new());
        }

        match node {
            Value::Array(blocks) => self.render_all(blocks, depth),
            Value::Object(map) => match map.get("type").and_then(Value::as_str) {
                Some(block_type) => self.render_block(block_type, map, depth),
                // Page root without a type of its own.
                None => match map.get("content") {
                    Some(Value::Array(blocks)) => self.render_all(blocks, depth + 1),
                    _ => Ok(String::new()),
                },
            },
            Value::String(text) => Ok(tera::escape_html(text)),
            _ => Ok(String::new()),
        }
    }

    fn render_all(&self, blocks: &[Value], depth: usize) -> Result<String, tera::Error> {
        let mut html = String::new();
        for block in blocks {
            html.push_str(&self.render_node(block, depth + 1)?);
        }
        Ok(html)
    }

    fn render_block(
        &self,
        block_type: &str,
        block: &Map<String, Value>,
        depth: usize,
    ) -> Result<String, tera::Error> {
        let no_props = Map::new();
        let props = block
            .get("props")
            .and_then(Value::as_object)
            .unwrap_or(&no_props);

        // Children may sit on the block or inside its props.
        let children = match block.get("children").or_else(|| props.get("children")) {
            Some(Value::Array(items)) => self.render_all(items, depth)?,
            _ => String::new(),
        };

        let name = sanitize_name(block_type);
        let template = format!("layout/{name}.html");
        if self.tera.get_template(&template).is_ok() {
            let mut context = Context::new();
            context.insert("block_type", &name);
            context.insert("props", props);
            context.insert("children", &children);
            return self.tera.render(&template, &context);
        }

        Ok(render_builtin(&name, props, &children))
    }
}

fn prop_str<'p>(props: &'p Map<String, Value>, key: &str) -> &'p str {
    props.get(key).and_then(Value::as_str).unwrap_or_default()
}

// Only web and site-relative URLs make it into `src`.
fn safe_url(url: &str) -> &str {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with('/') {
        url
    } else {
        ""
    }
}

fn render_builtin(name: &str, props: &Map<String, Value>, children: &str) -> String {
    match name {
        "heading" => {
            let level = props
                .get("level")
                .and_then(Value::as_u64)
                .unwrap_or(2)
                .clamp(1, 6);
            format!(
                "<h{level}>{}</h{level}>",
                tera::escape_html(prop_str(props, "text"))
            )
        }
        "text" | "paragraph" => {
            format!("<p>{}</p>", tera::escape_html(prop_str(props, "text")))
        }
        "image" => format!(
            "<img src=\"{}\" alt=\"{}\" />",
            tera::escape_html(safe_url(prop_str(props, "src"))),
            tera::escape_html(prop_str(props, "alt"))
        ),
        "html" | "richtext" => ammonia::clean(prop_str(props, "html")),
        "container" | "section" | "columns" => {
            format!("<div class=\"layout-{name}\">{children}</div>")
        }
        _ => format!("<div class=\"block block--{name}\">{children}</div>"),
    }
}
