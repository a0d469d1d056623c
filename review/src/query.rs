//! The typed-block query protocol.
//!
//! One query renders a prompt, calls the model, and extracts a single
//! tagged block from the reply. Malformed replies get a corrective
//! follow-up asking the model to reformat its previous output; transport
//! failures are retried as-is. Both draw from the same attempt budget.

use crate::extract::{classify, ContentType, Extraction, TypedBlock};
use crate::prompt::{render, PromptContext, PromptError};
use llm::LlmClient;
use log::{debug, warn};
use thiserror::Error;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// No usable block after the whole attempt budget. `last_raw` keeps the
/// final malformed reply for diagnostics only; callers must not expose it.
#[derive(Debug, Error)]
#[error("no usable {content_type} block after {attempts} attempt(s)")]
pub struct ExtractionError {
    pub content_type: ContentType,
    pub attempts: u32,
    pub last_raw: Option<String>,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// A successfully extracted block plus how many attempts it took.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extracted {
    pub block: TypedBlock,
    pub attempts: u32,
}

const REFORMAT_TASK: &str = "Your previous reply, included as PREVIOUS_REPLY, could not be used. \
Reply again with the same content, this time as exactly one fenced code block \
of the required type, with nothing outside the block.";

/// Ask the model for exactly one block of `content_type`, retrying up to
/// `max_attempts` times total.
pub async fn query_block(
    client: &dyn LlmClient,
    content_type: ContentType,
    task: &str,
    context: &PromptContext,
    max_attempts: u32,
) -> Result<Extracted, QueryError> {
    let max_attempts = max_attempts.max(1);
    let mut prompt = render(content_type, task, context)?;
    let mut last_raw = None;
    let mut attempts = 0;

    while attempts < max_attempts {
        attempts += 1;
        let raw = match client.complete(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!("model call failed on attempt {attempts}: {err}");
                continue;
            }
        };
        match classify(content_type, &raw) {
            Extraction::Block(payload) | Extraction::Bare(payload) => {
                return Ok(Extracted {
                    block: TypedBlock {
                        content_type,
                        payload,
                    },
                    attempts,
                });
            }
            outcome => {
                debug!("attempt {attempts} produced no {content_type} block: {outcome:?}");
                let corrective = PromptContext::new().text("PREVIOUS_REPLY", raw.clone());
                prompt = render(content_type, REFORMAT_TASK, &corrective)?;
                last_raw = Some(raw);
            }
        }
    }

    Err(ExtractionError {
        content_type,
        attempts,
        last_raw,
    }
    .into())
}
