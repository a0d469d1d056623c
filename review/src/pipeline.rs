//! The three-stage review pipeline: draft, persona refine, format.
//!
//! Each stage is one typed-block query; its output feeds the next stage's
//! prompt context. Stages never reorder, never skip, and a failed query
//! aborts the run with no partial output.

use crate::extract::{ContentType, TypedBlock};
use crate::profile::PersonaProfile;
use crate::prompt::PromptContext;
use crate::query::{query_block, Extracted, QueryError, DEFAULT_MAX_ATTEMPTS};
use indoc::indoc;
use llm::LlmClient;
use log::debug;
use std::sync::Arc;

/// Checklist injected into the draft stage. Compiled in; reviews are graded
/// against the same rubric for every persona.
const REVIEW_GUIDELINES: &str = indoc! {"
    ### Core Understanding
    - Story Comprehension: demonstrates thorough understanding of the plot, characters, and themes without unnecessary summary
    - Contextual Understanding: places the work within broader literary and genre context

    ### Analytical Approach
    - Analysis Depth: goes beyond surface observations to explore underlying meaning
    - Critical Insights: offers perspectives that enhance the reader's understanding of the work
    - Balanced Perspective: acknowledges both strengths and weaknesses with fair consideration

    ### Persuasive Elements
    - Persuasive Arguments: supports judgments with clear reasoning and evidence from the text
    - Review Credibility: establishes trustworthiness through consistent, well-supported evaluations
    - Specific Examples: references concrete moments from the work to illustrate points

    ### Personal Elements
    - Personal Connection: articulates how the work resonated with the reviewer
    - Emotional Resonance: communicates genuine emotional responses to the work's impact
    - Relatable Examples: uses comparisons that help readers connect to the reviewer's experience
    - Authentic Voice: maintains a distinctive, honest perspective reflecting the reviewer's personality

    ### Technical Assessment
    - Genre Awareness: shows understanding of genre conventions and how the work upholds or subverts them
    - Educational Value: provides insights that deepen the reader's appreciation of the work

    ### Structural Elements
    - Logical Flow: progresses naturally from point to point with smooth transitions
    - Focused Points: emphasizes key observations without digressions

    ### Additional Elements
    - Euphemistic Language: discusses sensitive content respectfully through indirect expression
    - Implied Content: suggests dimensions of the work without stating everything outright
    - Reader Intrigue: creates curiosity that motivates readers to discover the work themselves
    - Humor: employs wit to make the review entertaining while informative

    ### Ultimate Goal
    - Reader Engagement: captures and maintains reader interest throughout the review
"};

const DRAFT_TASK: &str = indoc! {"
    - Take on the personality of REVIEWER, who has just read the fictional STORY.
    - As REVIEWER, write a short (1-2 paragraph) newspaper-style review of the STORY based on how REVIEWER would react.
    - Use the REVIEW_GUIDELINES to inform your review.
    - Make it clear that you read the STORY, but keep the review spoiler-free: describe general premises, never major plot points or the resolution.
    - Discuss which audiences may find the story entertaining.
    - Make the review entertaining and fitting to the personality and experiences of REVIEWER.
    - Strive for balance; consider REVIEWER's preferences and values. She may not like every story!
"};

const REFINE_TASK: &str = indoc! {"
    Provide a cleaned up version of the REVIEW. To clean up the REVIEW:
    - Make sure all of the text is in-character for REVIEWER.
    - Do not include an assent like 'Okay, here's my review' or 'Here is a review'.
    - Use common pony-isms: e.g. 'anypony' or 'everypony' instead of 'anybody' or 'everybody', 'hoof' instead of 'hand'.
    - Make sure the review isn't meta. Do not mention anything that suggests the reviewer's world exists as a television show, and treat any show-adjacent references as fictional versions of real places, characters, and events.
"};

const FORMAT_TASK: &str = indoc! {"
    - Format the REVIEW as html. Make it pretty.
    - Leave the exact content of the review intact, verbatim. Only change the formatting.
    - Do not use semantic tags like <article> or <code>.
    - Do not include any titles or headers.
    - Feel free to use italics, bold, and other formatting to make the review more readable, scannable, and engaging.
"};

/// Result of a full pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewOutcome {
    /// The formatted review, the pipeline's terminal block.
    pub block: TypedBlock,
    /// Stages completed; always 3 on success.
    pub stages: usize,
    /// Whether any stage needed more than one attempt.
    pub retried: bool,
}

/// A review generator bound to one persona and a shared model engine.
pub struct ReviewPipeline {
    profile: PersonaProfile,
    client: Arc<dyn LlmClient>,
    max_attempts: u32,
}

impl std::fmt::Debug for ReviewPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewPipeline")
            .field("profile", &self.profile)
            .field("client", &"<dyn LlmClient>")
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl ReviewPipeline {
    pub fn new(profile: PersonaProfile, client: Arc<dyn LlmClient>) -> Self {
        Self::with_max_attempts(profile, client, DEFAULT_MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(
        profile: PersonaProfile,
        client: Arc<dyn LlmClient>,
        max_attempts: u32,
    ) -> Self {
        Self {
            profile,
            client,
            max_attempts,
        }
    }

    pub fn profile(&self) -> &PersonaProfile {
        &self.profile
    }

    /// Run all three stages over `story` and return the formatted review.
    pub async fn review(&self, story: &str) -> Result<ReviewOutcome, QueryError> {
        let mut retried = false;

        let draft = self
            .stage(
                ContentType::Markdown,
                DRAFT_TASK,
                PromptContext::new()
                    .profile("REVIEWER", self.profile.clone())
                    .text("STORY", story)
                    .text("REVIEW_GUIDELINES", REVIEW_GUIDELINES),
                &mut retried,
            )
            .await?;

        let refined = self
            .stage(
                ContentType::Markdown,
                REFINE_TASK,
                PromptContext::new()
                    .profile("REVIEWER", self.profile.clone())
                    .text("STORY", story)
                    .text("REVIEW", draft.payload),
                &mut retried,
            )
            .await?;

        let formatted = self
            .stage(
                ContentType::Html,
                FORMAT_TASK,
                PromptContext::new().text("REVIEW", refined.payload),
                &mut retried,
            )
            .await?;

        Ok(ReviewOutcome {
            block: formatted,
            stages: 3,
            retried,
        })
    }

    async fn stage(
        &self,
        content_type: ContentType,
        task: &str,
        context: PromptContext,
        retried: &mut bool,
    ) -> Result<TypedBlock, QueryError> {
        let Extracted { block, attempts } = query_block(
            self.client.as_ref(),
            content_type,
            task,
            &context,
            self.max_attempts,
        )
        .await?;
        debug!(
            "{}: {} stage done in {attempts} attempt(s)",
            self.profile.name, content_type
        );
        *retried |= attempts > 1;
        Ok(block)
    }
}
