//! A small parser for "exactly one tagged fenced block" over raw model
//! output.
//!
//! Model replies are expected to carry one fenced code block tagged with the
//! requested content type. [`scan`] recognizes the fence grammar (a line of
//! ```` ```tag ````, body lines, a closing line of ```` ``` ````);
//! [`classify`] applies the extraction policy on top of it and reports a
//! tagged outcome instead of ad hoc string checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The syntactic form a stage expects its payload in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Markdown,
    Html,
}

impl ContentType {
    /// Canonical fence tag for prompts.
    pub fn tag(self) -> &'static str {
        match self {
            ContentType::Markdown => "markdown",
            ContentType::Html => "html",
        }
    }

    /// Whether a fence tag found in model output matches this type. Models
    /// routinely shorten `markdown` to `md`; an untagged fence is accepted
    /// for any type.
    fn matches(self, tag: &str) -> bool {
        let tag = tag.to_ascii_lowercase();
        match self {
            ContentType::Markdown => tag.is_empty() || tag == "markdown" || tag == "md",
            ContentType::Html => tag.is_empty() || tag == "html",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One unit of model output: a payload together with the declared form the
/// payload was requested (and extracted) in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedBlock {
    pub content_type: ContentType,
    pub payload: String,
}

/// A fenced block found in raw output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fence {
    pub tag: String,
    pub body: String,
}

/// Outcome of extracting one typed block from raw model output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extraction {
    /// The first fence tagged with the requested type; trimmed payload.
    Block(String),
    /// No fence syntax anywhere; the whole trimmed output taken as payload.
    Bare(String),
    /// Fences were present but none matched; carries the first found tag.
    WrongType(String),
    /// Fence syntax present but no usable payload.
    Missing,
}

/// Scan raw output for fenced blocks. A fence opens at a line whose trimmed
/// form is ```` ``` ```` followed by an optional tag, and closes at the next
/// line that is exactly ```` ``` ````. An unterminated fence runs to the end
/// of the output; models drop the closing fence often enough that treating
/// it as absent would throw away good payloads.
pub fn scan(raw: &str) -> Vec<Fence> {
    let mut fences = Vec::new();
    let mut open: Option<(String, Vec<&str>)> = None;
    for line in raw.lines() {
        let trimmed = line.trim();
        match open.take() {
            None => {
                if let Some(rest) = trimmed.strip_prefix("```") {
                    open = Some((rest.trim().to_string(), Vec::new()));
                }
            }
            Some((tag, mut body)) => {
                if trimmed == "```" {
                    fences.push(Fence {
                        tag,
                        body: body.join("\n"),
                    });
                } else {
                    body.push(line);
                    open = Some((tag, body));
                }
            }
        }
    }
    if let Some((tag, body)) = open {
        fences.push(Fence {
            tag,
            body: body.join("\n"),
        });
    }
    fences
}

/// Apply the extraction policy for `content_type` to raw model output.
/// Multiplicity resolves to the first matching fence, deterministically.
pub fn classify(content_type: ContentType, raw: &str) -> Extraction {
    let fences = scan(raw);
    if fences.is_empty() {
        if raw.contains("```") {
            return Extraction::Missing;
        }
        let trimmed = raw.trim();
        return if trimmed.is_empty() {
            Extraction::Missing
        } else {
            Extraction::Bare(trimmed.to_string())
        };
    }
    match fences.iter().find(|f| content_type.matches(&f.tag)) {
        Some(fence) => {
            let payload = fence.body.trim();
            if payload.is_empty() {
                Extraction::Missing
            } else {
                Extraction::Block(payload.to_string())
            }
        }
        None => Extraction::WrongType(fences[0].tag.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_tagged_block() {
        let raw = "Sure!\n```markdown\nA fine tale.\n```\nHope that helps.";
        assert_eq!(
            classify(ContentType::Markdown, raw),
            Extraction::Block("A fine tale.".into())
        );
    }

    #[test]
    fn md_is_an_alias_for_markdown() {
        let raw = "```md\nshort tag\n```";
        assert_eq!(
            classify(ContentType::Markdown, raw),
            Extraction::Block("short tag".into())
        );
    }

    #[test]
    fn bare_output_is_taken_verbatim() {
        let raw = "  Just the review text, no fences.  ";
        assert_eq!(
            classify(ContentType::Html, raw),
            Extraction::Bare("Just the review text, no fences.".into())
        );
    }

    #[test]
    fn empty_output_is_missing() {
        assert_eq!(classify(ContentType::Markdown, "   \n "), Extraction::Missing);
    }

    #[test]
    fn wrong_tag_is_reported() {
        let raw = "```html\n<p>hi</p>\n```";
        assert_eq!(
            classify(ContentType::Markdown, raw),
            Extraction::WrongType("html".into())
        );
    }

    #[test]
    fn first_of_multiple_matching_blocks_wins() {
        let raw = "```markdown\nfirst\n```\n\n```markdown\nsecond\n```";
        assert_eq!(
            classify(ContentType::Markdown, raw),
            Extraction::Block("first".into())
        );
    }

    #[test]
    fn untagged_fence_matches_any_type() {
        let raw = "```\n<p>payload</p>\n```";
        assert_eq!(
            classify(ContentType::Html, raw),
            Extraction::Block("<p>payload</p>".into())
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let raw = "```markdown\nno closing fence here";
        assert_eq!(
            classify(ContentType::Markdown, raw),
            Extraction::Block("no closing fence here".into())
        );
    }

    #[test]
    fn empty_fence_body_is_missing() {
        let raw = "```markdown\n\n```";
        assert_eq!(classify(ContentType::Markdown, raw), Extraction::Missing);
    }

    #[test]
    fn skips_wrong_tag_to_reach_matching_block() {
        let raw = "```html\n<p>nope</p>\n```\n```markdown\nyes\n```";
        assert_eq!(
            classify(ContentType::Markdown, raw),
            Extraction::Block("yes".into())
        );
    }

    #[test]
    fn inline_backticks_do_not_open_a_fence() {
        let raw = "The word ```markdown``` appears mid-sentence here.";
        // No line-level fence, but delimiter syntax is present, so the
        // output is not trusted as a bare payload.
        assert_eq!(classify(ContentType::Markdown, raw), Extraction::Missing);
    }
}
