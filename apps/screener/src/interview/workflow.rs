//! Drives the model calls around the session state machine.
//!
//! Model-call failures stop here: generation degrades to "no questions",
//! scoring to `Assessment::call_failed()`. Prompt errors are configuration
//! problems and go back to the caller.

use tracing::{info, warn};

use crate::interview::questions::generate_questions;
use crate::interview::scoring::{score_answer, Assessment, ScoreSource};
use crate::interview::session::{ScreeningSession, SessionError};
use crate::interview::InterviewError;
use crate::llm_client::TextGenerator;
use crate::prompts::PromptLoader;

/// Generates questions and moves the session into `interviewing`.
///
/// When the model fails or returns nothing usable the session stays in
/// `collecting_input` and `SessionError::NoQuestions` is returned so the
/// caller can ask the user to retry.
pub async fn start_interview(
    session: &mut ScreeningSession,
    llm: &dyn TextGenerator,
    prompts: &PromptLoader,
) -> Result<(), InterviewError> {
    session.ensure_ready()?;

    let questions = match generate_questions(
        llm,
        prompts,
        session.job_description(),
        session.resume_text(),
    )
    .await
    {
        Ok(questions) => questions,
        Err(InterviewError::Model(e)) => {
            warn!("Question generation failed: {e}");
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    if questions.is_empty() {
        return Err(SessionError::NoQuestions.into());
    }
    session.begin_interview(questions)?;
    info!(
        "Interview started with {} questions",
        session.questions().len()
    );
    Ok(())
}

/// Saves the final draft, scores every answer in order, and moves the session
/// into `reviewing`.
pub async fn finish_interview(
    session: &mut ScreeningSession,
    draft: String,
    llm: &dyn TextGenerator,
    prompts: &PromptLoader,
) -> Result<(), InterviewError> {
    let pending = session.finish(draft)?;

    let mut assessments = Vec::with_capacity(pending.len());
    for (idx, item) in pending.iter().enumerate() {
        let assessment = match score_answer(llm, prompts, &item.question, &item.answer).await {
            Ok(assessment) => assessment,
            Err(InterviewError::Model(e)) => {
                warn!("Scoring question {} failed: {e}", idx + 1);
                Assessment::call_failed()
            }
            Err(e) => {
                session.abort_scoring()?;
                return Err(e);
            }
        };
        if assessment.source == ScoreSource::MalformedResponse {
            warn!(
                "Scoring question {} returned an unparseable response; using default score",
                idx + 1
            );
        }
        assessments.push(assessment);
    }

    session.complete_scoring(assessments)?;
    info!(
        "Interview scored: average {:?} over {} questions",
        session.average_score(),
        session.questions().len()
    );
    Ok(())
}
