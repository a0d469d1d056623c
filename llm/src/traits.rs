use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response")]
    InvalidResponse,
    #[error("bad engine configuration: {0}")]
    Config(String),
}

/// A language model engine that turns one prompt into one completion.
///
/// Implementations own transport concerns (endpoints, timeouts, rate
/// limits); callers only see prompt text in and raw completion text out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
