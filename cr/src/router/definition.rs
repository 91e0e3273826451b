//! Router definitions loaded from YAML
//!
//! Lets a router be specialized without code:
//!
//! ```yaml
//! name: suporte
//! classifier-prompt: classify        # optional, a prompt name
//! routes:
//!   - name: faturamento
//!     description: Cobranças, boletos e notas fiscais.
//!     keywords: [boleto, fatura]
//!     template: |
//!       Você é do time financeiro. Pergunta: {{user_input}}
//!   - name: default
//!     description: Todo o resto.
//!     prompt: default                # a prompt name instead of an inline template
//! ```
//!
//! `classifier-template` (inline) wins over `classifier-prompt`; with neither,
//! the domain-neutral `classify` prompt is used. Each route needs either an
//! inline `template` or a `prompt` name.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{RouteDefinition, RouteTable, Router, RouterError};
use crate::llm::LlmClient;
use crate::prompts::PromptLoader;

/// Prompt used as classifier when a definition names none
pub const DEFAULT_CLASSIFIER_PROMPT: &str = "classify";

/// A whole router as written in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterDefinition {
    /// Human-readable name, for logs and banners
    #[serde(default)]
    pub name: Option<String>,

    /// Inline classifier template
    #[serde(rename = "classifier-template", default)]
    pub classifier_template: Option<String>,

    /// Classifier prompt name resolved through the prompt loader
    #[serde(rename = "classifier-prompt", default)]
    pub classifier_prompt: Option<String>,

    pub routes: Vec<RouteEntry>,
}

/// One route plus the template that answers it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    pub name: String,

    pub description: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// Inline template
    #[serde(default)]
    pub template: Option<String>,

    /// Prompt name resolved through the prompt loader
    #[serde(default)]
    pub prompt: Option<String>,
}

impl RouterDefinition {
    /// Read and parse a definition file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, "RouterDefinition::load: called");
        let content = fs::read_to_string(path).context(format!("Failed to read router definition {}", path.display()))?;
        let def = Self::from_yaml(&content).context(format!("Failed to parse router definition {}", path.display()))?;
        info!("Loaded router definition from: {}", path.display());
        Ok(def)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// The route table this definition describes
    pub fn route_table(&self) -> Result<RouteTable, RouterError> {
        RouteTable::new(
            self.routes
                .iter()
                .map(|r| RouteDefinition::new(r.name.clone(), r.description.clone(), r.keywords.clone()))
                .collect(),
        )
    }

    /// Build a router, resolving prompt names through `loader`
    pub fn build(&self, llm: Arc<dyn LlmClient>, loader: &PromptLoader) -> Result<Router, RouterError> {
        debug!(name = ?self.name, route_count = self.routes.len(), "RouterDefinition::build: called");
        let table = self.route_table()?;

        let classifier = match (&self.classifier_template, &self.classifier_prompt) {
            (Some(inline), _) => inline.clone(),
            (None, Some(prompt)) => loader.load_template(prompt)?,
            (None, None) => loader.load_template(DEFAULT_CLASSIFIER_PROMPT)?,
        };

        let mut templates = HashMap::new();
        for entry in &self.routes {
            let source = match (&entry.template, &entry.prompt) {
                (Some(inline), _) => inline.clone(),
                (None, Some(prompt)) => loader.load_template(prompt)?,
                (None, None) => {
                    return Err(RouterError::MissingTemplate {
                        route: entry.name.clone(),
                    });
                }
            };
            templates.insert(entry.name.clone(), source);
        }

        Router::new(llm, table, &classifier, &templates)
    }
}
