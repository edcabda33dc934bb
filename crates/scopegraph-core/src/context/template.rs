//! Template rendering boundary.
//!
//! The tree only produces the data projection; rendering is delegated to
//! whatever [`TemplateRenderer`] the caller passes in.

use std::sync::OnceLock;

use regex::Regex;

use super::value::{self, Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated { offset: usize },

    #[error("template rendering failed: {0}")]
    Render(String),
}

/// Renders a template string against `{level: {container: data}}`.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, data: &Map<String, Value>) -> Result<String, TemplateError>;
}

/// Substitutes `{{ level.container.key }}` placeholders.
///
/// Keys may go deeper than one segment. Missing values render as an empty
/// string; strings are inserted unquoted and other values as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

fn placeholder_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").ok())
        .as_ref()
}

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template: &str, data: &Map<String, Value>) -> Result<String, TemplateError> {
        let re = placeholder_regex()
            .ok_or_else(|| TemplateError::Render("placeholder pattern unavailable".into()))?;
        let root = Value::Object(data.clone());

        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        for caps in re.captures_iter(template) {
            let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            check_literal(template, last, whole.start())?;
            out.push_str(&template[last..whole.start()]);
            let parts: Vec<&str> = key.as_str().split('.').collect();
            if let Some(v) = value::lookup_nested(&root, &parts) {
                out.push_str(&value::value_to_string(v));
            }
            last = whole.end();
        }
        check_literal(template, last, template.len())?;
        out.push_str(&template[last..]);
        Ok(out)
    }
}

fn check_literal(template: &str, start: usize, end: usize) -> Result<(), TemplateError> {
    match template[start..end].find("{{") {
        Some(pos) => Err(TemplateError::Unterminated { offset: start + pos }),
        None => Ok(()),
    }
}
