//! Startup-built dispatch table from persona/model name to pipeline.

use crate::pipeline::ReviewPipeline;
use crate::profile::PersonaProfile;
use crate::query::DEFAULT_MAX_ATTEMPTS;
use llm::LlmClient;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("model not found: {0}")]
    UnknownModel(String),
    #[error("duplicate persona name: {0}")]
    DuplicateName(String),
}

/// Read-only map from persona name to its pipeline. Built once during
/// startup; concurrent lookups need no locking afterwards.
#[derive(Debug)]
pub struct Registry {
    entries: HashMap<String, Arc<ReviewPipeline>>,
}

impl Registry {
    pub fn build(
        profiles: Vec<PersonaProfile>,
        client: Arc<dyn LlmClient>,
    ) -> Result<Self, RegistryError> {
        Self::build_with_max_attempts(profiles, client, DEFAULT_MAX_ATTEMPTS)
    }

    pub fn build_with_max_attempts(
        profiles: Vec<PersonaProfile>,
        client: Arc<dyn LlmClient>,
        max_attempts: u32,
    ) -> Result<Self, RegistryError> {
        let mut entries = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            let name = profile.name.clone();
            let pipeline = Arc::new(ReviewPipeline::with_max_attempts(
                profile,
                client.clone(),
                max_attempts,
            ));
            if entries.insert(name.clone(), pipeline).is_some() {
                return Err(RegistryError::DuplicateName(name));
            }
        }
        Ok(Self { entries })
    }

    pub fn resolve(&self, model: &str) -> Result<&Arc<ReviewPipeline>, RegistryError> {
        self.entries
            .get(model)
            .ok_or_else(|| RegistryError::UnknownModel(model.to_string()))
    }

    /// Registered model names, sorted for stable listings.
    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::ScriptedClient;

    fn profile(name: &str) -> PersonaProfile {
        PersonaProfile {
            name: name.into(),
            description: format!("{name} the reviewer"),
            quotes: vec![],
        }
    }

    fn client() -> Arc<dyn LlmClient> {
        Arc::new(ScriptedClient::replying(vec![]))
    }

    #[test]
    fn resolves_to_the_same_pipeline_every_time() {
        let registry = Registry::build(vec![profile("Applejack")], client()).unwrap();
        let first = registry.resolve("Applejack").unwrap().clone();
        let second = registry.resolve("Applejack").unwrap().clone();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unknown_model_is_its_own_error() {
        let registry = Registry::build(vec![profile("Applejack")], client()).unwrap();
        let err = registry.resolve("NoSuchPony").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownModel(name) if name == "NoSuchPony"));
    }

    #[test]
    fn duplicate_names_fail_construction() {
        let err =
            Registry::build(vec![profile("Applejack"), profile("Applejack")], client())
                .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(name) if name == "Applejack"));
    }

    #[test]
    fn model_names_are_sorted() {
        let registry =
            Registry::build(vec![profile("Rarity"), profile("Applejack")], client()).unwrap();
        assert_eq!(registry.model_names(), vec!["Applejack", "Rarity"]);
    }
}
