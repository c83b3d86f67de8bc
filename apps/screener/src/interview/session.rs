//! Screening session state machine.
//!
//! ```text
//! collecting_input ──start──▶ interviewing ──finish──▶ scoring ──▶ reviewing
//!        ▲   │ (no questions)     ◀─previous/next─▶        │
//!        └───┘                                              └─(fatal)─▶ interviewing
//! ```
//!
//! Every method checks the phase first and leaves the session untouched when
//! the action is not allowed. Model calls live in `workflow`; this module is
//! pure state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interview::questions::MAX_QUESTIONS;
use crate::interview::scoring::{Assessment, ScoreSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    CollectingInput,
    Interviewing,
    Scoring,
    Reviewing,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::CollectingInput => "collecting_input",
            Phase::Interviewing => "interviewing",
            Phase::Scoring => "scoring",
            Phase::Reviewing => "reviewing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while the session is {phase}")]
    InvalidAction { action: &'static str, phase: Phase },

    #[error("{field} must not be empty")]
    MissingInput { field: &'static str },

    #[error("question generation produced no questions")]
    NoQuestions,

    #[error("already at the first question")]
    NoPreviousQuestion,

    #[error("already at the last question")]
    NoNextQuestion,

    #[error("finish is only available on the last question")]
    NotLastQuestion,

    #[error("expected {expected} assessments, got {actual}")]
    AssessmentCountMismatch { expected: usize, actual: usize },
}

/// One question/answer pair handed to the scorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnswer {
    pub question: String,
    pub answer: String,
}

/// All state of one screening interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreeningSession {
    job_description: String,
    resume_text: String,
    questions: Vec<String>,
    answers: BTreeMap<usize, String>,
    scores: BTreeMap<usize, u8>,
    explanations: BTreeMap<usize, String>,
    /// Origin of each score. Not persisted.
    sources: BTreeMap<usize, ScoreSource>,
    current_index: usize,
    completed: bool,
    phase: Phase,
}

impl ScreeningSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn resume_text(&self) -> &str {
        &self.resume_text
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    pub fn scores(&self) -> &BTreeMap<usize, u8> {
        &self.scores
    }

    pub fn explanations(&self) -> &BTreeMap<usize, String> {
        &self.explanations
    }

    pub fn sources(&self) -> &BTreeMap<usize, ScoreSource> {
        &self.sources
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    // ── collecting_input ────────────────────────────────────────────────

    pub fn set_job_description(&mut self, text: String) -> Result<(), SessionError> {
        self.expect_phase(Phase::CollectingInput, "change the job description")?;
        self.job_description = text;
        Ok(())
    }

    pub fn set_resume_text(&mut self, text: String) -> Result<(), SessionError> {
        self.expect_phase(Phase::CollectingInput, "change the resume")?;
        self.resume_text = text;
        Ok(())
    }

    /// Checks that the interview can start: right phase, both inputs present.
    pub fn ensure_ready(&self) -> Result<(), SessionError> {
        self.expect_phase(Phase::CollectingInput, "start the interview")?;
        if self.job_description.trim().is_empty() {
            return Err(SessionError::MissingInput {
                field: "job_description",
            });
        }
        if self.resume_text.trim().is_empty() {
            return Err(SessionError::MissingInput {
                field: "resume_text",
            });
        }
        Ok(())
    }

    /// Enters `interviewing` at the first question. With no questions the
    /// session stays in `collecting_input`.
    pub fn begin_interview(&mut self, mut questions: Vec<String>) -> Result<(), SessionError> {
        self.ensure_ready()?;
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        questions.truncate(MAX_QUESTIONS);

        self.questions = questions;
        self.answers.clear();
        self.scores.clear();
        self.explanations.clear();
        self.sources.clear();
        self.current_index = 0;
        self.completed = false;
        self.phase = Phase::Interviewing;
        Ok(())
    }

    // ── interviewing ────────────────────────────────────────────────────

    pub fn current_question(&self) -> Option<&str> {
        match self.phase {
            Phase::Interviewing => self.questions.get(self.current_index).map(String::as_str),
            _ => None,
        }
    }

    /// The saved answer for the current question, empty if none yet.
    pub fn current_draft(&self) -> &str {
        self.answers
            .get(&self.current_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    pub fn previous(&mut self, draft: String) -> Result<(), SessionError> {
        self.expect_phase(Phase::Interviewing, "go to the previous question")?;
        if self.current_index == 0 {
            return Err(SessionError::NoPreviousQuestion);
        }
        self.answers.insert(self.current_index, draft);
        self.current_index -= 1;
        Ok(())
    }

    pub fn next(&mut self, draft: String) -> Result<(), SessionError> {
        self.expect_phase(Phase::Interviewing, "go to the next question")?;
        if self.is_last_question() {
            return Err(SessionError::NoNextQuestion);
        }
        self.answers.insert(self.current_index, draft);
        self.current_index += 1;
        Ok(())
    }

    /// Saves the last draft, enters `scoring` and returns every question with
    /// its answer in order. Unanswered questions carry an empty answer.
    pub fn finish(&mut self, draft: String) -> Result<Vec<PendingAnswer>, SessionError> {
        self.expect_phase(Phase::Interviewing, "finish the interview")?;
        if !self.is_last_question() {
            return Err(SessionError::NotLastQuestion);
        }
        self.answers.insert(self.current_index, draft);
        self.phase = Phase::Scoring;

        Ok(self
            .questions
            .iter()
            .enumerate()
            .map(|(idx, question)| PendingAnswer {
                question: question.clone(),
                answer: self.answers.get(&idx).cloned().unwrap_or_default(),
            })
            .collect())
    }

    // ── scoring ─────────────────────────────────────────────────────────

    /// Stores one assessment per question, in question order, and enters `reviewing`.
    pub fn complete_scoring(&mut self, assessments: Vec<Assessment>) -> Result<(), SessionError> {
        self.expect_phase(Phase::Scoring, "record scores")?;
        if assessments.len() != self.questions.len() {
            return Err(SessionError::AssessmentCountMismatch {
                expected: self.questions.len(),
                actual: assessments.len(),
            });
        }
        for (idx, assessment) in assessments.into_iter().enumerate() {
            self.scores.insert(idx, assessment.score);
            self.explanations.insert(idx, assessment.explanation);
            self.sources.insert(idx, assessment.source);
        }
        self.completed = true;
        self.phase = Phase::Reviewing;
        Ok(())
    }

    /// Returns to the last question after scoring could not run. Answers are kept.
    pub fn abort_scoring(&mut self) -> Result<(), SessionError> {
        self.expect_phase(Phase::Scoring, "abort scoring")?;
        self.phase = Phase::Interviewing;
        Ok(())
    }

    // ── reviewing ───────────────────────────────────────────────────────

    pub fn ensure_reviewing(&self, action: &'static str) -> Result<(), SessionError> {
        self.expect_phase(Phase::Reviewing, action)
    }

    /// Mean of all scores rounded to one decimal, `None` when nothing was scored.
    pub fn average_score(&self) -> Option<f64> {
        average_score(self.scores.values().copied())
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            completed: self.is_completed(),
            has_job_description: !self.job_description.trim().is_empty(),
            has_resume: !self.resume_text.trim().is_empty(),
            interview: self.interview_view(),
            review: self.review_view(),
        }
    }

    pub fn interview_view(&self) -> Option<InterviewView> {
        let question = self.current_question()?;
        Some(InterviewView {
            question_number: self.current_index + 1,
            total_questions: self.questions.len(),
            question: question.to_string(),
            draft: self.current_draft().to_string(),
            can_go_previous: self.current_index > 0,
            can_go_next: !self.is_last_question(),
            can_finish: self.is_last_question(),
        })
    }

    pub fn review_view(&self) -> Option<ReviewView> {
        if self.phase != Phase::Reviewing {
            return None;
        }
        let items = self
            .questions
            .iter()
            .enumerate()
            .map(|(idx, question)| ReviewItem {
                question_number: idx + 1,
                question: question.clone(),
                answer: self.answers.get(&idx).cloned().unwrap_or_default(),
                score: self.scores.get(&idx).copied(),
                explanation: self.explanations.get(&idx).cloned(),
                source: self.sources.get(&idx).copied(),
            })
            .collect();
        Some(ReviewView {
            average_score: self.average_score(),
            items,
        })
    }

    fn expect_phase(&self, phase: Phase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(SessionError::InvalidAction {
                action,
                phase: self.phase,
            })
        }
    }

    /// Rebuilds a reviewed session from its saved parts.
    pub(crate) fn from_parts(parts: SessionParts) -> Self {
        Self {
            job_description: parts.job_description,
            resume_text: parts.resume_text,
            current_index: parts.questions.len().saturating_sub(1),
            questions: parts.questions,
            answers: parts.answers,
            scores: parts.scores,
            explanations: parts.explanations,
            sources: BTreeMap::new(),
            completed: true,
            phase: Phase::Reviewing,
        }
    }
}

/// The persisted fields of a reviewed session.
pub(crate) struct SessionParts {
    pub job_description: String,
    pub resume_text: String,
    pub questions: Vec<String>,
    pub answers: BTreeMap<usize, String>,
    pub scores: BTreeMap<usize, u8>,
    pub explanations: BTreeMap<usize, String>,
}

pub fn average_score(scores: impl IntoIterator<Item = u8>) -> Option<f64> {
    let (sum, count) = scores
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), s| (sum + s as u32, count + 1));
    if count == 0 {
        return None;
    }
    let mean = sum as f64 / count as f64;
    Some((mean * 10.0).round() / 10.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Views
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub completed: bool,
    pub has_job_description: bool,
    pub has_resume: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview: Option<InterviewView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewView {
    /// 1-based.
    pub question_number: usize,
    pub total_questions: usize,
    pub question: String,
    pub draft: String,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub can_finish: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    /// `None` renders as "no score".
    pub average_score: Option<f64>,
    pub items: Vec<ReviewItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewItem {
    pub question_number: usize,
    pub question: String,
    pub answer: String,
    pub score: Option<u8>,
    pub explanation: Option<String>,
    /// Absent for results loaded from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ScoreSource>,
}
