use crate::client::OllamaClient;
use crate::traits::LlmError;

/// Create an [`OllamaClient`] from the `OLLAMA_URL` and `OLLAMA_MODEL`
/// environment variables.
pub fn client_from_env() -> Result<OllamaClient, LlmError> {
    let url = std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".into());
    OllamaClient::new(&url, model_from_env())
}

/// Read the completion model name from the `OLLAMA_MODEL` environment
/// variable.
pub fn model_from_env() -> String {
    std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "gemma3:27b".into())
}
