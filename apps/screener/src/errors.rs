use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::archive::PersistenceError;
use crate::interview::session::SessionError;
use crate::interview::InterviewError;
use crate::prompts::PromptError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Question generation failed")]
    GenerationFailed,

    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoQuestions => AppError::GenerationFailed,
            SessionError::MissingInput { .. } => AppError::Validation(err.to_string()),
            SessionError::AssessmentCountMismatch { .. } => {
                AppError::Internal(anyhow::Error::new(err))
            }
            SessionError::InvalidAction { .. }
            | SessionError::NoPreviousQuestion
            | SessionError::NoNextQuestion
            | SessionError::NotLastQuestion => AppError::InvalidTransition(err.to_string()),
        }
    }
}

impl From<InterviewError> for AppError {
    fn from(err: InterviewError) -> Self {
        match err {
            InterviewError::Session(e) => e.into(),
            InterviewError::Prompt(e) => e.into(),
            // The workflow absorbs model failures; reaching here is a bug.
            InterviewError::Model(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, "INVALID_TRANSITION", msg.clone())
            }
            AppError::GenerationFailed => (
                StatusCode::BAD_GATEWAY,
                "GENERATION_FAILED",
                "Could not generate interview questions. Please try again.".to_string(),
            ),
            AppError::Prompt(e) => {
                tracing::error!("Prompt configuration error: {e}");
                let code = match e {
                    PromptError::Missing { .. } => "PROMPT_MISSING",
                    _ => "PROMPT_ERROR",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, code, e.to_string())
            }
            AppError::Persistence(PersistenceError::NotFound(name)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Saved result '{name}' not found"),
            ),
            AppError::Persistence(e @ PersistenceError::Invalid { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PERSISTENCE_ERROR",
                e.to_string(),
            ),
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "Could not read or write the screening result".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
