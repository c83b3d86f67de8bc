// Screening interview: question generation, answer scoring, the session
// state machine and the in-memory session store.
// All model calls go through llm_client::TextGenerator.

pub mod handlers;
pub mod questions;
pub mod scoring;
pub mod session;
pub mod store;
pub mod workflow;

use thiserror::Error;

use crate::interview::session::SessionError;
use crate::llm_client::LlmError;
use crate::prompts::PromptError;

#[derive(Debug, Error)]
pub enum InterviewError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("model call failed: {0}")]
    Model(#[from] LlmError),
}
