//! Shared test doubles for the integration tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chainroute::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};

/// Scripted model: answers in order, records every prompt
pub struct StubLlm {
    answers: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scripted(answers.into_iter().map(|a| Ok(a.into())))
    }

    pub fn scripted(answers: impl IntoIterator<Item = Result<String, LlmError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.prompts.lock().unwrap().push(request.prompt);
        let next = self.answers.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(CompletionResponse::text(text)),
            Some(Err(e)) => Err(e),
            None => Err(LlmError::InvalidResponse("stub script exhausted".to_string())),
        }
    }
}
