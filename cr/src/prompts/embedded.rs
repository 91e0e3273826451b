//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Stage 1 of the series recommender: pull search criteria out of free text
pub const EXTRACT: &str = include_str!("../../prompts/extract.pmt");

/// Stage 2 of the series recommender: suggest a series from the criteria
pub const RECOMMEND: &str = include_str!("../../prompts/recommend.pmt");

/// Triage classifier, answers with a bare specialty name
pub const ROUTER: &str = include_str!("../../prompts/router.pmt");

/// Domain-neutral classifier for routers defined in YAML
pub const CLASSIFY: &str = include_str!("../../prompts/classify.pmt");

pub const PEDIATRIA: &str = include_str!("../../prompts/pediatria.pmt");
pub const NUTROLOGIA: &str = include_str!("../../prompts/nutrologia.pmt");
pub const PSICOLOGIA: &str = include_str!("../../prompts/psicologia.pmt");
pub const FISIOTERAPIA: &str = include_str!("../../prompts/fisioterapia.pmt");
pub const DEFAULT: &str = include_str!("../../prompts/default.pmt");

/// Names of every embedded prompt
pub const NAMES: &[&str] = &[
    "extract",
    "recommend",
    "router",
    "classify",
    "pediatria",
    "nutrologia",
    "psicologia",
    "fisioterapia",
    "default",
];

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "extract" => Some(EXTRACT),
        "recommend" => Some(RECOMMEND),
        "router" => Some(ROUTER),
        "classify" => Some(CLASSIFY),
        "pediatria" => Some(PEDIATRIA),
        "nutrologia" => Some(NUTROLOGIA),
        "psicologia" => Some(PSICOLOGIA),
        "fisioterapia" => Some(FISIOTERAPIA),
        "default" => Some(DEFAULT),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
