//! HTTP client for completing prompts against an Ollama server.
//!
//! This module provides the [`OllamaClient`] type which implements the
//! [`LlmClient`] trait by sending one generation request per prompt and
//! collecting the whole completion.

use crate::traits::{LlmClient, LlmError};
use async_trait::async_trait;

use ollama_rs::{generation::completion::request::GenerationRequest, Ollama};

pub struct OllamaClient {
    inner: Ollama,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: impl AsRef<str>, model: impl Into<String>) -> Result<Self, LlmError> {
        let inner = Ollama::try_new(base_url.as_ref())
            .map_err(|e| LlmError::Config(e.to_string()))?;
        Ok(Self {
            inner,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let req = GenerationRequest::new(self.model.clone(), prompt.to_string());
        let res = self
            .inner
            .generate(req)
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;
        Ok(res.response)
    }
}
