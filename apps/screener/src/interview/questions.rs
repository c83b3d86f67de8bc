//! Question Generator — turns a job description and resume into interview questions.

use tracing::info;

use crate::interview::InterviewError;
use crate::llm_client::TextGenerator;
use crate::prompts::{PromptLoader, GENERATE_QUESTIONS_PROMPT};

/// Upper bound on questions per interview.
pub const MAX_QUESTIONS: usize = 3;

/// Calls the model once and returns up to `MAX_QUESTIONS` questions.
///
/// A failed model call comes back as `InterviewError::Model`; a missing or
/// broken template as `InterviewError::Prompt`. The caller decides what an
/// empty result means.
pub async fn generate_questions(
    llm: &dyn TextGenerator,
    prompts: &PromptLoader,
    job_description: &str,
    resume_text: &str,
) -> Result<Vec<String>, InterviewError> {
    let prompt = prompts.load(GENERATE_QUESTIONS_PROMPT).await?.fill(&[
        ("job_description", job_description),
        ("resume_text", resume_text),
    ])?;

    let response = llm.generate(&prompt).await?;
    let questions = parse_questions(&response);
    info!("Generated {} interview questions", questions.len());
    Ok(questions)
}

/// Non-empty trimmed lines of the response, first `MAX_QUESTIONS` only.
pub fn parse_questions(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_QUESTIONS)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedGenerator;

    fn loader_with_template(dir: &tempfile::TempDir) -> PromptLoader {
        std::fs::write(
            dir.path().join(GENERATE_QUESTIONS_PROMPT),
            "JD={job_description}\nCV={resume_text}",
        )
        .unwrap();
        PromptLoader::new(dir.path())
    }

    #[test]
    fn test_parse_keeps_first_three_trimmed_in_order() {
        let response = "  First?  \n\nSecond?\n   \n\tThird?\nFourth?\nFifth?\n";
        assert_eq!(
            parse_questions(response),
            vec!["First?", "Second?", "Third?"]
        );
    }

    #[test]
    fn test_parse_fewer_than_three_returns_all() {
        assert_eq!(parse_questions("Only one?\n\n"), vec!["Only one?"]);
        assert_eq!(parse_questions("A?\r\nB?"), vec!["A?", "B?"]);
    }

    #[test]
    fn test_parse_blank_response_is_empty() {
        assert!(parse_questions("").is_empty());
        assert!(parse_questions(" \n\t\n").is_empty());
    }

    #[tokio::test]
    async fn test_generate_fills_template_and_parses() {
        let dir = tempfile::tempdir().unwrap();
        let prompts = loader_with_template(&dir);
        let llm = ScriptedGenerator::new().reply("Q1\nQ2\nQ3\nQ4\nQ5");

        let questions = generate_questions(&llm, &prompts, "Rust dev", "10y C++")
            .await
            .unwrap();

        assert_eq!(questions, vec!["Q1", "Q2", "Q3"]);
        assert_eq!(llm.prompts(), vec!["JD=Rust dev\nCV=10y C++".to_string()]);
    }

    #[tokio::test]
    async fn test_generate_surfaces_model_failure() {
        let dir = tempfile::tempdir().unwrap();
        let prompts = loader_with_template(&dir);
        let llm = ScriptedGenerator::new().fail(503);

        let err = generate_questions(&llm, &prompts, "jd", "cv")
            .await
            .unwrap_err();
        assert!(matches!(err, InterviewError::Model(_)));
    }

    #[tokio::test]
    async fn test_generate_missing_template_skips_model() {
        let dir = tempfile::tempdir().unwrap();
        let prompts = PromptLoader::new(dir.path());
        let llm = ScriptedGenerator::new().reply("Q1");

        let err = generate_questions(&llm, &prompts, "jd", "cv")
            .await
            .unwrap_err();
        assert!(matches!(err, InterviewError::Prompt(_)));
        assert!(llm.prompts().is_empty());
    }
}
