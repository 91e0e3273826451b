//! Routing
//!
//! An LLM picks one of a fixed set of named routes for the user's input, then
//! the route's own prompt answers it. Labels the classifier invents are
//! remapped to the `default` route rather than failing the request.

mod definition;
mod engine;
mod error;
pub mod medical;
mod route;

pub use definition::{DEFAULT_CLASSIFIER_PROMPT, RouteEntry, RouterDefinition};
pub use engine::{RouteSelection, Router, RoutingResult};
pub use error::RouterError;
pub use route::{RouteDefinition, RouteTable};

/// The route every router must have, and the fallback for unknown labels
pub const DEFAULT_ROUTE: &str = "default";
