//! Prompt Loader — reads task prompt templates from the prompts directory.
//!
//! Templates are loaded fresh for every call so edits on disk take effect
//! without a restart. A missing template is a configuration error; there is no
//! built-in fallback.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::error;

pub const GENERATE_QUESTIONS_PROMPT: &str = "generate_questions_prompt.txt";
pub const SCORE_ANSWER_PROMPT: &str = "score_answer_prompt.txt";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt file '{name}' not found in {dir}")]
    Missing { name: String, dir: String },

    #[error("Prompt file '{name}' could not be read: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Prompt '{name}' uses placeholder {{{placeholder}}} with no value")]
    UnknownPlaceholder { name: String, placeholder: String },

    #[error("Prompt '{name}' has an unbalanced brace at byte {position}")]
    UnbalancedBrace { name: String, position: usize },
}

#[derive(Debug, Clone)]
pub struct PromptLoader {
    dir: PathBuf,
}

impl PromptLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn load(&self, name: &str) -> Result<PromptTemplate, PromptError> {
        let path = self.dir.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(PromptTemplate::new(name, body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!("Prompt file '{}' not found at {}", name, path.display());
                Err(PromptError::Missing {
                    name: name.to_string(),
                    dir: self.dir.display().to_string(),
                })
            }
            Err(source) => Err(PromptError::Io {
                name: name.to_string(),
                source,
            }),
        }
    }
}

/// A prompt with `{placeholder}` slots. `{{` and `}}` are literal braces.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    body: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Substitutes every placeholder. Values are inserted verbatim and never
    /// re-scanned, so braces inside a resume stay as they are.
    pub fn fill(&self, values: &[(&str, &str)]) -> Result<String, PromptError> {
        let body = self.body.as_str();
        let mut out = String::with_capacity(body.len());
        let mut rest = body;

        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let offset = body.len() - rest.len() + pos;
            let tail = &rest[pos..];

            if let Some(after) = tail.strip_prefix("{{") {
                out.push('{');
                rest = after;
            } else if let Some(after) = tail.strip_prefix("}}") {
                out.push('}');
                rest = after;
            } else if tail.starts_with('}') {
                return Err(self.unbalanced(offset));
            } else {
                let close = tail.find('}').ok_or_else(|| self.unbalanced(offset))?;
                let key = &tail[1..close];
                let value = values
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| PromptError::UnknownPlaceholder {
                        name: self.name.clone(),
                        placeholder: key.to_string(),
                    })?;
                out.push_str(value);
                rest = &tail[close + 1..];
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    fn unbalanced(&self, position: usize) -> PromptError {
        PromptError::UnbalancedBrace {
            name: self.name.clone(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_substitutes_every_placeholder() {
        let t = PromptTemplate::new("t", "Q: {question}\nA: {answer}\nAgain: {question}");
        let out = t
            .fill(&[("question", "Why Rust?"), ("answer", "Safety")])
            .unwrap();
        assert_eq!(out, "Q: Why Rust?\nA: Safety\nAgain: Why Rust?");
    }

    #[test]
    fn test_fill_unescapes_double_braces() {
        let t = PromptTemplate::new("t", "Return {{\"score\": n}} for {answer}");
        let out = t.fill(&[("answer", "x")]).unwrap();
        assert_eq!(out, "Return {\"score\": n} for x");
    }

    #[test]
    fn test_fill_does_not_rescan_values() {
        let t = PromptTemplate::new("t", "{resume_text}");
        let out = t.fill(&[("resume_text", "skills: {rust}")]).unwrap();
        assert_eq!(out, "skills: {rust}");
    }

    #[test]
    fn test_fill_rejects_unknown_placeholder() {
        let t = PromptTemplate::new("t", "Hello {name}");
        let err = t.fill(&[("question", "q")]).unwrap_err();
        assert!(matches!(
            err,
            PromptError::UnknownPlaceholder { ref placeholder, .. } if placeholder == "name"
        ));
    }

    #[test]
    fn test_fill_rejects_stray_braces() {
        let open = PromptTemplate::new("t", "broken {question");
        assert!(matches!(
            open.fill(&[("question", "q")]),
            Err(PromptError::UnbalancedBrace { position: 7, .. })
        ));
        let close = PromptTemplate::new("t", "broken } here");
        assert!(matches!(
            close.fill(&[]),
            Err(PromptError::UnbalancedBrace { position: 7, .. })
        ));
    }

    #[tokio::test]
    async fn test_load_reads_fresh_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SCORE_ANSWER_PROMPT);
        std::fs::write(&path, "v1 {question}").unwrap();

        let loader = PromptLoader::new(dir.path());
        let first = loader.load(SCORE_ANSWER_PROMPT).await.unwrap();
        assert_eq!(first.fill(&[("question", "q")]).unwrap(), "v1 q");

        std::fs::write(&path, "v2 {question}").unwrap();
        let second = loader.load(SCORE_ANSWER_PROMPT).await.unwrap();
        assert_eq!(second.fill(&[("question", "q")]).unwrap(), "v2 q");
    }

    #[tokio::test]
    async fn test_load_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let loader = PromptLoader::new(dir.path());
        let err = loader.load(GENERATE_QUESTIONS_PROMPT).await.unwrap_err();
        assert!(matches!(err, PromptError::Missing { ref name, .. } if name == GENERATE_QUESTIONS_PROMPT));
    }

    #[tokio::test]
    async fn test_shipped_templates_fill_cleanly() {
        let loader = PromptLoader::new(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts"));

        let questions = loader.load(GENERATE_QUESTIONS_PROMPT).await.unwrap();
        let filled = questions
            .fill(&[("job_description", "JD"), ("resume_text", "CV")])
            .unwrap();
        assert!(filled.contains("JD") && filled.contains("CV"));

        let scoring = loader.load(SCORE_ANSWER_PROMPT).await.unwrap();
        let filled = scoring
            .fill(&[("question", "QQ"), ("answer", "AA")])
            .unwrap();
        assert!(filled.contains("QQ") && filled.contains("AA"));
    }
}
