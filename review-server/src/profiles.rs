//! Startup loading of the persona profile document.

use review::{parse_profiles, PersonaProfile, ProfileError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetching profile document: {0}")]
    Http(#[from] reqwest::Error),
    #[error("reading profile document: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

pub const DEFAULT_SOURCE: &str = "profiles.json";

/// The profile source from the `PROFILES` environment variable: a local
/// path, or an http(s) URL to fetch the document from.
pub fn source_from_env() -> String {
    std::env::var("PROFILES").unwrap_or_else(|_| DEFAULT_SOURCE.into())
}

pub async fn load(source: &str) -> Result<Vec<PersonaProfile>, LoadError> {
    let doc = if source.starts_with("http://") || source.starts_with("https://") {
        reqwest::get(source)
            .await?
            .error_for_status()?
            .text()
            .await?
    } else {
        tokio::fs::read_to_string(source).await?
    };
    Ok(parse_profiles(&doc)?)
}

pub async fn load_from_env() -> Result<Vec<PersonaProfile>, LoadError> {
    load(&source_from_env()).await
}
