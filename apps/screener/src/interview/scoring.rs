//! Answer Scorer — asks the model to rate one answer and parses its verdict.

use serde::Serialize;

use crate::interview::InterviewError;
use crate::llm_client::TextGenerator;
use crate::prompts::{PromptLoader, SCORE_ANSWER_PROMPT};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;
pub const FALLBACK_SCORE: u8 = 6;

/// Used when the model answered but not in the `<score> - <explanation>` shape.
pub const MALFORMED_RESPONSE_EXPLANATION: &str =
    "Good attempt! The answer was somewhat clear and relevant.";

/// Used when the model could not be reached at all.
pub const CALL_FAILED_EXPLANATION: &str =
    "The AI had trouble evaluating this one. We gave a fair score based on typical performance.";

/// Characters allowed between the score and the explanation.
const SEPARATORS: &[char] = &['-', ':', '.', ',', ')', '|', '–', '—'];

/// Where an assessment's score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Model,
    MalformedResponse,
    CallFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    /// Always within `MIN_SCORE..=MAX_SCORE`.
    pub score: u8,
    pub explanation: String,
    pub source: ScoreSource,
}

impl Assessment {
    pub fn malformed_response() -> Self {
        Self {
            score: FALLBACK_SCORE,
            explanation: MALFORMED_RESPONSE_EXPLANATION.to_string(),
            source: ScoreSource::MalformedResponse,
        }
    }

    pub fn call_failed() -> Self {
        Self {
            score: FALLBACK_SCORE,
            explanation: CALL_FAILED_EXPLANATION.to_string(),
            source: ScoreSource::CallFailed,
        }
    }
}

/// Scores one answer with a single model call.
///
/// Returns `InterviewError::Model` when the call fails; the caller substitutes
/// `Assessment::call_failed()`. A reply that cannot be parsed is not an error.
pub async fn score_answer(
    llm: &dyn TextGenerator,
    prompts: &PromptLoader,
    question: &str,
    answer: &str,
) -> Result<Assessment, InterviewError> {
    let prompt = prompts
        .load(SCORE_ANSWER_PROMPT)
        .await?
        .fill(&[("question", question), ("answer", answer)])?;

    let response = llm.generate(&prompt).await?;
    Ok(parse_assessment(&response))
}

/// Parses `<score><separator><explanation>`, e.g. `8 - Clear and specific.`
/// or `7/10: Vague on details.`
pub fn parse_assessment(response: &str) -> Assessment {
    let content = response.trim();
    if content.chars().count() < 2 || !content.starts_with(|c: char| c.is_ascii_digit()) {
        return Assessment::malformed_response();
    }

    let digits_end = content
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(content.len());
    // The whole digit run, so "10" reads as ten. Overflow saturates and clamps.
    let raw_score = content[..digits_end].parse::<u32>().unwrap_or(u32::MAX);

    let rest = &content[digits_end..];
    let rest = rest.strip_prefix("/10").unwrap_or(rest);
    let explanation = rest
        .trim_start_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .trim_end();

    Assessment {
        score: clamp_score(raw_score),
        explanation: explanation.to_string(),
        source: ScoreSource::Model,
    }
}

pub fn clamp_score(raw: u32) -> u8 {
    raw.clamp(MIN_SCORE as u32, MAX_SCORE as u32) as u8
}
