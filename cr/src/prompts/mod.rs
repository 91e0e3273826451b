//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files.
//!
//! Template loading chain:
//! 1. `prompts.dir` from config, when set
//! 2. `.chainroute/prompts/{name}.pmt` (user override)
//! 3. `prompts/{name}.pmt` (repo default)
//! 4. Embedded fallback in code
//!
//! Templates use Handlebars syntax for slot substitution (`{{user_input}}`).

pub mod embedded;
mod error;
mod loader;
mod registry;

pub use error::PromptError;
pub use loader::PromptLoader;
pub use registry::TemplateRegistry;
