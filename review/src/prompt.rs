//! Prompt assembly for typed-block queries.
//!
//! A prompt is a fixed preamble demanding exactly one tagged fenced block,
//! followed by each context variable as a labeled `<NAME>...</NAME>`
//! section, followed by the task instruction. Rendering is a pure function
//! of its inputs; collisions between a variable's content and the fence
//! syntax are handled by the balancing-aware extractor, not escaped here.

use crate::extract::ContentType;
use crate::profile::PersonaProfile;
use indoc::formatdoc;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("invalid variable name {0:?}")]
    BadIdentifier(String),
}

/// A value bound to a named variable in a stage prompt.
#[derive(Clone, Debug, PartialEq)]
pub enum PromptValue {
    Text(String),
    List(Vec<String>),
    Profile(PersonaProfile),
}

impl fmt::Display for PromptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptValue::Text(text) => write!(f, "{}", text.trim_end()),
            PromptValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "- {item}")?;
                }
                Ok(())
            }
            PromptValue::Profile(profile) => {
                write!(f, "Name: {}\n{}", profile.name, profile.description.trim_end())?;
                if !profile.quotes.is_empty() {
                    write!(f, "\nVoice samples:")?;
                    for quote in &profile.quotes {
                        write!(f, "\n- {quote}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Ordered set of named variables for one stage prompt.
#[derive(Clone, Debug, Default)]
pub struct PromptContext {
    entries: Vec<(String, PromptValue)>,
}

impl PromptContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((name.into(), PromptValue::Text(value.into())));
        self
    }

    pub fn list(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.entries.push((name.into(), PromptValue::List(values)));
        self
    }

    pub fn profile(mut self, name: impl Into<String>, profile: PersonaProfile) -> Self {
        self.entries.push((name.into(), PromptValue::Profile(profile)));
        self
    }

    pub fn entries(&self) -> &[(String, PromptValue)] {
        &self.entries
    }
}

fn valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Render one complete prompt for a typed-block query.
pub fn render(
    content_type: ContentType,
    task: &str,
    context: &PromptContext,
) -> Result<String, PromptError> {
    let tag = content_type.tag();
    let mut out = formatdoc! {"
        You are a careful assistant. Respond with exactly one fenced code block
        tagged `{tag}`: begin with a line containing only ```{tag}, end with a
        line containing only ```, and write nothing outside that block.
    "};

    for (name, value) in &context.entries {
        if !valid_identifier(name) {
            return Err(PromptError::BadIdentifier(name.clone()));
        }
        out.push_str(&format!("\n<{name}>\n{value}\n</{name}>\n"));
    }

    out.push_str("\nTask:\n");
    out.push_str(task.trim_end());
    out.push('\n');
    Ok(out)
}
