//! Writes reviewed sessions to timestamped JSON files.
//!
//! Files are write-once: `screening_YYYYMMDD_HHMMSS.json` in the data
//! directory. Two saves within the same second share a name and the later one
//! wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::interview::questions::MAX_QUESTIONS;
use crate::interview::scoring::{MAX_SCORE, MIN_SCORE};
use crate::interview::session::{ScreeningSession, SessionParts};

const FILE_PREFIX: &str = "screening_";
const FILE_SUFFIX: &str = ".json";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Saved result '{0}' not found")]
    NotFound(String),

    #[error("Saved result '{name}' is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

/// On-disk snapshot of a reviewed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedResult {
    pub job_description: String,
    pub resume_text: String,
    pub questions: Vec<String>,
    /// Keys are question indexes; JSON writes them as strings.
    pub answers: BTreeMap<usize, String>,
    pub scores: BTreeMap<usize, u8>,
    pub explanations: BTreeMap<usize, String>,
    pub timestamp: DateTime<Local>,
}

impl PersistedResult {
    pub fn from_session(session: &ScreeningSession, timestamp: DateTime<Local>) -> Self {
        Self {
            job_description: session.job_description().to_string(),
            resume_text: session.resume_text().to_string(),
            questions: session.questions().to_vec(),
            answers: session.answers().clone(),
            scores: session.scores().clone(),
            explanations: session.explanations().clone(),
            timestamp,
        }
    }

    /// Rebuilds the reviewed session this snapshot was taken from.
    pub fn into_session(self) -> ScreeningSession {
        ScreeningSession::from_parts(SessionParts {
            job_description: self.job_description,
            resume_text: self.resume_text,
            questions: self.questions,
            answers: self.answers,
            scores: self.scores,
            explanations: self.explanations,
        })
    }

    /// Checks the session invariants a hand-edited file could break.
    pub fn validate(&self) -> Result<(), String> {
        let total = self.questions.len();
        if total > MAX_QUESTIONS {
            return Err(format!("{total} questions, at most {MAX_QUESTIONS} allowed"));
        }
        let keys = self
            .answers
            .keys()
            .chain(self.scores.keys())
            .chain(self.explanations.keys());
        for &idx in keys {
            if idx >= total {
                return Err(format!("index {idx} has no matching question"));
            }
        }
        if let Some((idx, score)) = self
            .scores
            .iter()
            .find(|(_, s)| !(MIN_SCORE..=MAX_SCORE).contains(*s))
        {
            return Err(format!(
                "score {score} for question {idx} is outside {MIN_SCORE}..={MAX_SCORE}"
            ));
        }
        Ok(())
    }

    pub fn file_name(&self) -> String {
        format!(
            "{FILE_PREFIX}{}{FILE_SUFFIX}",
            self.timestamp.format("%Y%m%d_%H%M%S")
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedResult {
    pub filename: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct ResultArchive {
    dir: PathBuf,
}

impl ResultArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the data directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| self.io_error(&self.dir, source))
    }

    pub async fn save(&self, session: &ScreeningSession) -> Result<SavedResult, PersistenceError> {
        self.save_at(session, Local::now()).await
    }

    pub async fn save_at(
        &self,
        session: &ScreeningSession,
        timestamp: DateTime<Local>,
    ) -> Result<SavedResult, PersistenceError> {
        let result = PersistedResult::from_session(session, timestamp);
        let filename = result.file_name();
        let path = self.dir.join(&filename);

        let body = serde_json::to_vec_pretty(&result)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| self.io_error(&path, source))?;

        info!("Saved screening result to {}", path.display());
        Ok(SavedResult {
            filename,
            timestamp,
        })
    }

    /// Reads a saved result by file name. Only names this archive produces
    /// are accepted, and the contents must satisfy the session invariants.
    pub async fn load(&self, filename: &str) -> Result<PersistedResult, PersistenceError> {
        if !is_result_file_name(filename) {
            return Err(PersistenceError::NotFound(filename.to_string()));
        }
        let path = self.dir.join(filename);
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound(filename.to_string()))
            }
            Err(source) => return Err(self.io_error(&path, source)),
        };
        let result: PersistedResult = serde_json::from_slice(&body)?;
        result.validate().map_err(|reason| {
            warn!("Rejected saved result {}: {reason}", path.display());
            PersistenceError::Invalid {
                name: filename.to_string(),
                reason,
            }
        })?;
        Ok(result)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

fn is_result_file_name(name: &str) -> bool {
    name.strip_prefix(FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
        .is_some_and(|stamp| {
            !stamp.is_empty() && stamp.chars().all(|c| c.is_ascii_digit() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::scoring::{Assessment, ScoreSource};
    use chrono::TimeZone;

    fn reviewed_session() -> ScreeningSession {
        let mut s = ScreeningSession::new();
        s.set_job_description("Platform engineer, Rust + Kubernetes".to_string())
            .unwrap();
        s.set_resume_text("Built a {scheduler} in Rust".to_string())
            .unwrap();
        s.begin_interview(vec![
            "How did you size the scheduler?".to_string(),
            "What broke first in production?".to_string(),
        ])
        .unwrap();
        s.next("Load tests at 3x peak".to_string()).unwrap();
        s.finish(String::new()).unwrap();
        s.complete_scoring(vec![
            Assessment {
                score: 8,
                explanation: "Concrete numbers.".to_string(),
                source: ScoreSource::Model,
            },
            Assessment::call_failed(),
        ])
        .unwrap();
        s
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = ResultArchive::new(dir.path());
        let session = reviewed_session();

        let saved = archive.save_at(&session, fixed_time()).await.unwrap();
        assert_eq!(saved.filename, "screening_20260314_092653.json");

        let loaded = archive.load(&saved.filename).await.unwrap();
        assert_eq!(loaded.timestamp, fixed_time());
        assert_eq!(loaded.questions, session.questions());
        assert_eq!(&loaded.answers, session.answers());
        assert_eq!(&loaded.scores, session.scores());
        assert_eq!(&loaded.explanations, session.explanations());

        let restored = loaded.into_session();
        assert_eq!(restored.phase(), session.phase());
        assert_eq!(restored.answers(), session.answers());
        assert_eq!(restored.average_score(), session.average_score());
        assert!(restored.sources().is_empty());
    }

    #[tokio::test]
    async fn test_load_rejects_broken_invariants() {
        let dir = tempfile::tempdir().unwrap();
        let archive = ResultArchive::new(dir.path());
        let saved = archive
            .save_at(&reviewed_session(), fixed_time())
            .await
            .unwrap();
        let path = dir.path().join(&saved.filename);
        let original: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        let edits: [(&str, serde_json::Value); 3] = [
            ("/scores/0", serde_json::json!(42)),
            ("/answers", serde_json::json!({"0": "a", "7": "stray"})),
            (
                "/questions",
                serde_json::json!(["q1", "q2", "q3", "q4"]),
            ),
        ];
        for (pointer, value) in edits {
            let mut edited = original.clone();
            *edited.pointer_mut(pointer).unwrap() = value;
            std::fs::write(&path, serde_json::to_vec_pretty(&edited).unwrap()).unwrap();

            let err = archive.load(&saved.filename).await.unwrap_err();
            assert!(
                matches!(err, PersistenceError::Invalid { .. }),
                "{pointer}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let archive = ResultArchive::new(dir.path());
        let saved = archive
            .save_at(&reviewed_session(), fixed_time())
            .await
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join(&saved.filename)).unwrap();
        assert!(raw.starts_with("{\n  \"job_description\""), "{raw}");

        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["questions"].as_array().unwrap().len(), 2);
        assert_eq!(json["answers"]["0"], "Load tests at 3x peak");
        assert_eq!(json["answers"]["1"], "");
        assert_eq!(json["scores"]["0"], 8);
        assert_eq!(json["scores"]["1"], 6);
        assert!(json["explanations"]["1"]
            .as_str()
            .unwrap()
            .starts_with("The AI had trouble"));
        assert!(json["timestamp"].as_str().unwrap().starts_with("2026-03-14T09:26:53"));
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let archive = ResultArchive::new(dir.path().join("a").join("b"));
        archive.ensure_dir().await.unwrap();
        assert!(archive.dir().is_dir());
    }

    #[tokio::test]
    async fn test_save_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let archive = ResultArchive::new(dir.path().join("missing"));
        let err = archive.save(&reviewed_session()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
    }

    #[tokio::test]
    async fn test_load_rejects_foreign_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("secrets.json"), "{}").unwrap();
        let archive = ResultArchive::new(dir.path());

        for name in [
            "secrets.json",
            "../screening_20260101_000000.json",
            "screening_.json",
            "screening_2026.txt",
        ] {
            assert!(
                matches!(archive.load(name).await, Err(PersistenceError::NotFound(_))),
                "{name} should be rejected"
            );
        }
        assert!(matches!(
            archive.load("screening_20260101_000000.json").await,
            Err(PersistenceError::NotFound(_))
        ));
    }
}
