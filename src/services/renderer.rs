//! HTML rendering of the form and result pages.
//!
//! Templates are compiled into the binary. Placeholders use `{{ key }}` and
//! every bound value is HTML-escaped.

use std::collections::HashMap;
use thiserror::Error;

pub const FORM_TEMPLATE: &str = "form";
pub const RESULT_TEMPLATE: &str = "result";

pub type Bindings = HashMap<&'static str, String>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template '{template}' requires binding '{key}'")]
    MissingBinding { template: String, key: String },
}

pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, bindings: &Bindings) -> Result<String, RenderError>;
}

struct Template {
    source: &'static str,
    required: &'static [&'static str],
}

pub struct HtmlRenderer {
    templates: HashMap<&'static str, Template>,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            FORM_TEMPLATE,
            Template {
                source: FORM_HTML,
                required: &["message"],
            },
        );
        templates.insert(
            RESULT_TEMPLATE,
            Template {
                source: RESULT_HTML,
                required: &["message", "file_name"],
            },
        );
        Self { templates }
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, template: &str, bindings: &Bindings) -> Result<String, RenderError> {
        let tpl = self
            .templates
            .get(template)
            .ok_or_else(|| RenderError::TemplateNotFound(template.to_string()))?;

        if let Some(key) = tpl.required.iter().find(|k| !bindings.contains_key(*k)) {
            return Err(RenderError::MissingBinding {
                template: template.to_string(),
                key: key.to_string(),
            });
        }

        Ok(substitute(tpl.source, bindings))
    }
}

/// Single pass over the source so bound values are never re-expanded.
/// Unknown placeholders render as empty strings.
fn substitute(source: &str, bindings: &Bindings) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                if let Some(value) = bindings.get(key) {
                    out.push_str(&escape_html(value));
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Smile Detection</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <h1>{{ message }}</h1>
  <form action="/process" method="post" enctype="multipart/form-data">
    <input type="file" name="file" accept=".png,.jpg">
    <button type="submit">Upload</button>
  </form>
</body>
</html>
"#;

const RESULT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Smile Detection - Result</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <p class="message" data-message="{{ message }}">{{ message }}</p>
  <p>Stored as <code class="file-name" data-file-name="{{ file_name }}">{{ file_name }}</code></p>
  <a href="/file/{{ file_name }}" download>Download</a>
  <a href="/">Upload another</a>
</body>
</html>
"#;
