//! Prompt chaining
//!
//! A fixed two-stage chain: the first model call turns free text into search
//! criteria, the second turns those criteria into a recommendation. The
//! criteria are passed to the second stage verbatim.

mod recommender;

pub use recommender::{EXTRACT_PROMPT, PipelineError, RECOMMEND_PROMPT, Recommendation, Recommender};
