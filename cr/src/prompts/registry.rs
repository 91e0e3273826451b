//! Compiled prompt templates
//!
//! Wraps a Handlebars registry configured for plain-text prompts: no HTML
//! escaping, and strict mode so a template naming a slot the caller does not
//! supply fails to render instead of silently producing an empty string.

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::PromptError;

pub struct TemplateRegistry {
    hbs: Handlebars<'static>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs.set_strict_mode(true);
        Self { hbs }
    }

    /// Compile `source` under `name`, replacing any previous template
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), PromptError> {
        debug!(%name, source_len = source.len(), "TemplateRegistry::register: called");
        self.hbs
            .register_template_string(name, source)
            .map_err(|e| PromptError::Template {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hbs.has_template(name)
    }

    /// Render a registered template with `data` filling its slots
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, PromptError> {
        debug!(%name, "TemplateRegistry::render: called");
        if !self.contains(name) {
            return Err(PromptError::NotFound(name.to_string()));
        }
        self.hbs.render(name, data).map_err(|e| PromptError::Render {
            name: name.to_string(),
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_fills_slots_verbatim() {
        let mut reg = TemplateRegistry::new();
        reg.register("t", "Consulta: {{user_input}}").unwrap();

        let out = reg.render("t", &json!({ "user_input": "dor & \"febre\" <3" })).unwrap();
        assert_eq!(out, "Consulta: dor & \"febre\" <3");
    }

    #[test]
    fn test_missing_slot_is_an_error() {
        let mut reg = TemplateRegistry::new();
        reg.register("t", "Critérios: {{search_criteria}}").unwrap();

        let err = reg.render("t", &json!({ "text_input": "x" })).unwrap_err();
        assert!(matches!(err, PromptError::Render { ref name, .. } if name == "t"));
    }

    #[test]
    fn test_malformed_template_rejected() {
        let mut reg = TemplateRegistry::new();
        let err = reg.register("broken", "Consulta: {{#if user_input}}").unwrap_err();
        assert!(matches!(err, PromptError::Template { ref name, .. } if name == "broken"));
        assert!(!reg.contains("broken"));
    }

    #[test]
    fn test_render_unknown_name() {
        let reg = TemplateRegistry::new();
        let err = reg.render("nope", &json!({})).unwrap_err();
        assert!(matches!(err, PromptError::NotFound(_)));
    }
}
