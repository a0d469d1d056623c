//! Abstractions for interacting with large language model servers.
//!
//! The `llm` crate defines a [`LlmClient`] trait along with a concrete
//! [`OllamaClient`] implementation and a [`ScriptedClient`] mock for tests.

pub mod client;
pub mod mock;
pub mod runner;
pub mod traits;

pub use client::OllamaClient;
pub use mock::ScriptedClient;
pub use runner::{client_from_env, model_from_env};
pub use traits::{LlmClient, LlmError};
