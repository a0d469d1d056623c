use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A reviewer persona. Loaded once at startup and immutable afterwards;
/// `name` doubles as the model name the persona is dispatched under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub name: String,
    pub description: String,
    pub quotes: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("invalid profile document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("profile with empty name")]
    EmptyName,
    #[error("profile {0:?} has an empty description")]
    EmptyDescription(String),
}

#[derive(Deserialize)]
struct RawProfile {
    profile: String,
    #[serde(default)]
    quotes: Vec<String>,
}

/// Parse the external profile document, a JSON object mapping persona name
/// to `{ "profile": ..., "quotes": [...] }`. Names and descriptions must be
/// present and non-empty; a broken document fails as a whole so no partial
/// persona set is ever registered.
pub fn parse_profiles(doc: &str) -> Result<Vec<PersonaProfile>, ProfileError> {
    let raw: BTreeMap<String, RawProfile> = serde_json::from_str(doc)?;
    let mut profiles = Vec::with_capacity(raw.len());
    for (name, entry) in raw {
        if name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }
        if entry.profile.trim().is_empty() {
            return Err(ProfileError::EmptyDescription(name));
        }
        profiles.push(PersonaProfile {
            name,
            description: entry.profile,
            quotes: entry.quotes,
        });
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profile_document() {
        let doc = r#"{
            "Applejack": {
                "profile": "Hardworking, honest, plainspoken farmpony.",
                "quotes": ["Ah reckon...", "That's just plain wrong."]
            },
            "Rarity": { "profile": "Dramatic fashionista with generous instincts." }
        }"#;
        let profiles = parse_profiles(doc).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "Applejack");
        assert_eq!(profiles[0].quotes.len(), 2);
        assert_eq!(profiles[1].name, "Rarity");
        assert!(profiles[1].quotes.is_empty());
    }

    #[test]
    fn rejects_empty_description() {
        let doc = r#"{ "Applejack": { "profile": "   " } }"#;
        let err = parse_profiles(doc).unwrap_err();
        assert!(matches!(err, ProfileError::EmptyDescription(name) if name == "Applejack"));
    }

    #[test]
    fn rejects_empty_name() {
        let doc = r#"{ "": { "profile": "somepony" } }"#;
        assert!(matches!(parse_profiles(doc), Err(ProfileError::EmptyName)));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_profiles("not json"), Err(ProfileError::Parse(_))));
    }
}
