//! Logic-light text templates with `{{path}}` interpolation,
//! `{{#each}}` iteration and `{{#if}}` / `{{else}}` conditionals.
//!
//! ```
//! use serde_json::json;
//!
//! let out = panelforge_template::render("Hello {{name}}", &json!({"name": "Bob"}));
//! assert_eq!(out, "Hello Bob");
//! ```
//!
//! Prompt definitions are parsed strictly at registration so broken
//! templates are caught early. The free [`render`] function never fails;
//! malformed fragments pass through as literal text.

mod eval;
mod lexer;
mod parser;

pub use eval::{stringify, truthy};
pub use parser::{Condition, Node};

use serde_json::Value;

/// Template structure errors. Only produced by strict parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error("unterminated tag at byte {offset}")]
    UnterminatedTag { offset: usize },

    #[error("unclosed {{{{#{block}}}}} opened at byte {offset}")]
    UnclosedBlock { block: &'static str, offset: usize },

    #[error("unexpected {tag} at byte {offset}")]
    UnexpectedTag { tag: String, offset: usize },

    #[error("invalid condition '{condition}' at byte {offset}")]
    InvalidCondition { condition: String, offset: usize },
}

/// A parsed template, reusable across renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse, rejecting unbalanced blocks and malformed tags.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let nodes = parser::Parser::new(source, true).parse_document()?;
        Ok(Self { nodes })
    }

    /// Parse, keeping anything malformed as literal text.
    pub fn parse_lenient(source: &str) -> Self {
        // Lenient parsing never reports an error.
        let nodes = parser::Parser::new(source, false)
            .parse_document()
            .unwrap_or_default();
        Self { nodes }
    }

    pub fn render(&self, data: &Value) -> String {
        eval::render_nodes(&self.nodes, data)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

/// Render `template` against `data` in one step. Never fails.
pub fn render(template: &str, data: &Value) -> String {
    match Template::parse(template) {
        Ok(t) => t.render(data),
        Err(e) => {
            tracing::warn!(error = %e, "Template is malformed, rendering leniently");
            Template::parse_lenient(template).render(data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_interpolation() {
        assert_eq!(render("Hello {{name}}", &json!({"name": "Bob"})), "Hello Bob");
    }

    #[test]
    fn each_over_scalars() {
        assert_eq!(render("{{#each xs}}{{this}},{{/each}}", &json!({"xs": [1, 2, 3]})), "1,2,3,");
    }

    #[test]
    fn each_over_empty_or_non_array() {
        let tpl = "[{{#each xs}}{{this}}{{/each}}]";
        assert_eq!(render(tpl, &json!({"xs": []})), "[]");
        assert_eq!(render(tpl, &json!({"xs": "nope"})), "[]");
        assert_eq!(render(tpl, &json!({})), "[]");
    }

    #[test]
    fn eq_conditional() {
        let tpl = r#"{{#if (eq kind "panel")}}P{{else}}other{{/if}}"#;
        assert_eq!(render(tpl, &json!({"kind": "panel"})), "P");
        assert_eq!(render(tpl, &json!({"kind": "scene"})), "other");
    }

    #[test]
    fn undefined_is_empty_and_objects_are_json() {
        assert_eq!(render("a{{missing.deep}}b", &json!({})), "ab");
        assert_eq!(
            render("{{project}}", &json!({"project": {"title": "X", "tags": [1]}})),
            r#"{"title":"X","tags":[1]}"#
        );
    }

    #[test]
    fn nested_each_and_if() {
        let data = json!({
            "chapters": [
                {"title": "One", "scenes": [{"title": "Dock"}, {"title": "Ship"}]},
                {"title": "Two", "scenes": []}
            ]
        });
        let tpl = "{{#each chapters}}{{title}}:{{#each scenes}}{{title}}{{#if @last}}{{else}}/{{/if}}{{/each}};{{/each}}";
        assert_eq!(render(tpl, &data), "One:Dock/Ship;Two:;");
    }

    #[test]
    fn outer_variables_visible_inside_each() {
        let data = json!({"project": {"title": "Tide"}, "xs": ["a"]});
        assert_eq!(render("{{#each xs}}{{project.title}}-{{this}}{{/each}}", &data), "Tide-a");
    }

    #[test]
    fn malformed_template_renders_leniently() {
        assert_eq!(render("{{#if x}}shown", &json!({"x": true})), "{{#if x}}shown");
        assert_eq!(render("a {{b", &json!({"b": 1})), "a {{b");
    }

    #[test]
    fn strict_parse_reports_errors() {
        let err = Template::parse("{{#each xs}}").unwrap_err();
        assert_eq!(err.to_string(), "unclosed {{#each}} opened at byte 0");
    }

    #[test]
    fn parsed_template_is_reusable() {
        let t = Template::parse("{{n}}").unwrap();
        assert_eq!(t.render(&json!({"n": 1})), "1");
        assert_eq!(t.render(&json!({"n": 2})), "2");
    }
}
