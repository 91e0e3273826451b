//! chainroute - prompt chaining and LLM routing
//!
//! Two orchestration patterns over a single model-calling collaborator:
//!
//! - **Prompt chaining**: a fixed two-stage chain where the first model call
//!   extracts search criteria from free text and the second turns them into a
//!   TV-series recommendation.
//! - **Routing**: a classifier call picks one of a fixed set of named routes,
//!   the label is normalized and falls back to `default` when it matches
//!   nothing, and the chosen route's own prompt answers the input.
//!
//! # Modules
//!
//! - [`llm`] - LLM client trait plus OpenAI and Anthropic backends
//! - [`prompts`] - Prompt templates, embedded and overridable on disk
//! - [`pipeline`] - The extract-then-recommend chain
//! - [`router`] - The routing engine, the medical triage router, YAML routers
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`repl`] - Interactive chat session

pub mod cli;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod repl;
pub mod router;

pub use config::{Config, LlmConfig};
pub use llm::{LlmClient, LlmError, create_client};
pub use pipeline::{PipelineError, Recommendation, Recommender};
pub use prompts::{PromptError, PromptLoader};
pub use router::{DEFAULT_ROUTE, RouteDefinition, RouteTable, Router, RouterDefinition, RouterError, RoutingResult};
