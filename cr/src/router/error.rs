//! Router error types

use thiserror::Error;

use crate::llm::LlmError;
use crate::prompts::PromptError;

/// Errors raised while building or running a [`Router`](super::Router)
///
/// Configuration problems are reported by the constructors, before any model
/// call. A classifier label that matches no route is not an error.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Route '{route}' has no prompt template")]
    MissingTemplate { route: String },

    #[error("Route table must contain a 'default' route")]
    MissingDefaultRoute,

    #[error("Duplicate route name: '{0}'")]
    DuplicateRoute(String),

    #[error("Invalid route name '{0}': names must be non-empty, trimmed and lowercase")]
    InvalidRouteName(String),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl RouterError {
    /// True for errors detected while building the router
    pub fn is_configuration(&self) -> bool {
        !matches!(self, RouterError::Llm(_))
    }
}
