//! Generic routing engine
//!
//! One model call classifies the input into a route name, a second call
//! answers it with that route's template:
//!
//! ```text
//! user input -> [classifier prompt] -> label -> normalize -> fallback -> [route prompt] -> response
//! ```
//!
//! Specializations supply data (routes plus templates); the classification,
//! fallback and dispatch logic lives here only.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{DEFAULT_ROUTE, RouteTable, RouterError};
use crate::llm::{self, DEFAULT_MAX_TOKENS, LlmClient};
use crate::prompts::TemplateRegistry;

/// Registry key of the classifier template; route templates live under `route:{name}`
const CLASSIFIER: &str = "classifier";

/// Outcome of one `route` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingResult {
    /// The route actually used, after fallback
    pub selected_route: String,
    /// Second model call output, verbatim
    pub response: String,
    /// The normalized classifier label when it matched no route
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmatched_label: Option<String>,
}

impl RoutingResult {
    /// User-facing note when the classifier label matched no route
    pub fn fallback_notice(&self) -> Option<String> {
        self.unmatched_label
            .as_ref()
            .map(|label| format!("rota '{}' não existe, usando '{}'", label, self.selected_route))
    }
}

/// A classifier label resolved against the route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSelection {
    pub route: String,
    pub unmatched_label: Option<String>,
}

impl RouteSelection {
    pub fn fell_back(&self) -> bool {
        self.unmatched_label.is_some()
    }
}

#[derive(Serialize)]
struct ClassifierSlots<'a> {
    routes_description: &'a str,
    user_input: &'a str,
}

#[derive(Serialize)]
struct RouteSlots<'a> {
    user_input: &'a str,
}

/// LLM-driven router over a fixed route table
pub struct Router {
    llm: Arc<dyn LlmClient>,
    routes: RouteTable,
    routes_description: String,
    templates: TemplateRegistry,
    max_tokens: u32,
}

impl Router {
    /// Build a router, checking every route has a usable template
    ///
    /// `templates` maps route name to template source. Keys with no matching
    /// route are ignored. Every template is compiled and test-rendered here so
    /// a bad slot fails now rather than on first use.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        routes: RouteTable,
        classifier_template: &str,
        templates: &HashMap<String, String>,
    ) -> Result<Self, RouterError> {
        debug!(route_count = routes.len(), template_count = templates.len(), "Router::new: called");
        let mut registry = TemplateRegistry::new();

        registry.register(CLASSIFIER, classifier_template)?;
        registry.render(
            CLASSIFIER,
            &ClassifierSlots {
                routes_description: "",
                user_input: "",
            },
        )?;

        for route in routes.iter() {
            let source = templates.get(route.name()).ok_or_else(|| RouterError::MissingTemplate {
                route: route.name().to_string(),
            })?;
            let key = route_key(route.name());
            registry.register(&key, source)?;
            registry.render(&key, &RouteSlots { user_input: "" })?;
        }

        for extra in templates.keys().filter(|k| !routes.contains(k)) {
            debug!(template = %extra, "Router::new: template has no route, ignoring");
        }

        let routes_description = routes.describe();
        info!(routes = ?routes.names(), "Router ready");

        Ok(Self {
            llm,
            routes,
            routes_description,
            templates: registry,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Cap the tokens requested from each model call
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Route names in configuration order
    pub fn available_routes(&self) -> Vec<String> {
        self.routes.names()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The route listing shown to the classifier
    pub fn routes_description(&self) -> &str {
        &self.routes_description
    }

    /// Classify then dispatch
    pub async fn route(&self, user_input: &str) -> Result<RoutingResult, RouterError> {
        debug!(input_len = user_input.len(), "route: called");
        let label = self.classify(user_input).await?;
        let selection = self.resolve_route(&label);
        let response = self.dispatch(&selection.route, user_input).await?;

        Ok(RoutingResult {
            selected_route: selection.route,
            response,
            unmatched_label: selection.unmatched_label,
        })
    }

    /// First model call: the raw classifier label
    pub async fn classify(&self, user_input: &str) -> Result<String, RouterError> {
        let prompt = self.templates.render(
            CLASSIFIER,
            &ClassifierSlots {
                routes_description: &self.routes_description,
                user_input,
            },
        )?;
        let label = llm::invoke(self.llm.as_ref(), prompt, self.max_tokens).await?;
        debug!(%label, "classify: classifier answered");
        Ok(label)
    }

    /// Normalize a classifier label and fall back to `default` on a miss
    ///
    /// Trimming and lowercasing is the only validation applied to the label.
    pub fn resolve_route(&self, label: &str) -> RouteSelection {
        let normalized = label.trim().to_lowercase();
        if self.routes.contains(&normalized) {
            debug!(route = %normalized, "resolve_route: matched");
            return RouteSelection {
                route: normalized,
                unmatched_label: None,
            };
        }

        warn!(label = %normalized, "Route '{}' not found, using '{}'", normalized, DEFAULT_ROUTE);
        RouteSelection {
            route: DEFAULT_ROUTE.to_string(),
            unmatched_label: Some(normalized),
        }
    }

    /// Second model call: answer with the selected route's template
    async fn dispatch(&self, route: &str, user_input: &str) -> Result<String, RouterError> {
        info!(%route, "dispatch: answering with route template");
        let prompt = self.templates.render(&route_key(route), &RouteSlots { user_input })?;
        Ok(llm::invoke(self.llm.as_ref(), prompt, self.max_tokens).await?)
    }
}

fn route_key(name: &str) -> String {
    format!("route:{}", name)
}
