//! Two-stage recommender
//!
//! ```text
//! text_input -> [extraction prompt] -> criteria -> [recommendation prompt] -> recommendation
//! ```

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::llm::{self, DEFAULT_MAX_TOKENS, LlmClient, LlmError};
use crate::prompts::{PromptError, PromptLoader, TemplateRegistry};

/// Prompt name of the extraction stage
pub const EXTRACT_PROMPT: &str = "extract";

/// Prompt name of the recommendation stage
pub const RECOMMEND_PROMPT: &str = "recommend";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Both stage outputs of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub criteria: String,
    pub recommendation: String,
}

#[derive(Serialize)]
struct ExtractSlots<'a> {
    text_input: &'a str,
}

#[derive(Serialize)]
struct RecommendSlots<'a> {
    search_criteria: &'a str,
}

/// Extract-then-recommend chain over one model client
pub struct Recommender {
    llm: Arc<dyn LlmClient>,
    templates: TemplateRegistry,
    max_tokens: u32,
}

impl Recommender {
    /// Build a chain from the two stage templates
    ///
    /// The extraction template takes `{{text_input}}`, the recommendation
    /// template takes `{{search_criteria}}`. Both are test-rendered here.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        extraction_template: &str,
        recommendation_template: &str,
    ) -> Result<Self, PipelineError> {
        debug!("Recommender::new: called");
        let mut templates = TemplateRegistry::new();

        templates.register(EXTRACT_PROMPT, extraction_template)?;
        templates.render(EXTRACT_PROMPT, &ExtractSlots { text_input: "" })?;

        templates.register(RECOMMEND_PROMPT, recommendation_template)?;
        templates.render(RECOMMEND_PROMPT, &RecommendSlots { search_criteria: "" })?;

        Ok(Self {
            llm,
            templates,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// The TV-series recommender, templates resolved by `loader`
    pub fn tv_series(llm: Arc<dyn LlmClient>, loader: &PromptLoader) -> Result<Self, PipelineError> {
        debug!("Recommender::tv_series: called");
        let extraction = loader.load_template(EXTRACT_PROMPT)?;
        let recommendation = loader.load_template(RECOMMEND_PROMPT)?;
        Self::new(llm, &extraction, &recommendation)
    }

    /// Cap the tokens requested from each model call
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Stage 1: pull the search criteria out of free text
    pub async fn extract_criteria(&self, text_input: &str) -> Result<String, PipelineError> {
        debug!(input_len = text_input.len(), "extract_criteria: called");
        let prompt = self.templates.render(EXTRACT_PROMPT, &ExtractSlots { text_input })?;
        let criteria = llm::invoke(self.llm.as_ref(), prompt, self.max_tokens).await?;
        debug!(criteria_len = criteria.len(), "extract_criteria: done");
        Ok(criteria)
    }

    /// Stage 2 alone, for callers that already hold the criteria
    pub async fn recommend_from_criteria(&self, criteria: &str) -> Result<String, PipelineError> {
        debug!(criteria_len = criteria.len(), "recommend_from_criteria: called");
        let prompt = self.templates.render(
            RECOMMEND_PROMPT,
            &RecommendSlots {
                search_criteria: criteria,
            },
        )?;
        Ok(llm::invoke(self.llm.as_ref(), prompt, self.max_tokens).await?)
    }

    /// Run both stages, extraction exactly once
    pub async fn recommend(&self, text_input: &str) -> Result<Recommendation, PipelineError> {
        debug!(input_len = text_input.len(), "recommend: called");
        let criteria = self.extract_criteria(text_input).await?;
        let recommendation = self.recommend_from_criteria(&criteria).await?;
        info!("recommend: chain complete");

        Ok(Recommendation {
            criteria,
            recommendation,
        })
    }
}
