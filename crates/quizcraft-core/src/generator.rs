//! Quiz generation orchestrator.
//!
//! Turns quiz settings into a prompt, asks a [`QuestionProvider`] for
//! questions, and validates the answer into a [`QuizSet`]. Transient
//! provider failures and malformed output are retried with exponential
//! backoff; authentication and unknown-model errors are not.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ProviderError;
use crate::model::{Question, QuizSet, QuizSettings};
use crate::traits::{extract_json_from_markdown, GenerateRequest, QuestionProvider};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);
const TOKENS_PER_QUESTION: u32 = 400;
const BASE_TOKENS: u32 = 512;
const MAX_TOKENS_CAP: u32 = 16_000;

/// Configuration for the generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Retries on provider errors or unusable output.
    pub max_retries: u32,
    /// Delay before the first retry; doubles after each.
    pub retry_delay: Duration,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            system_prompt_override: None,
        }
    }
}

/// Shape the model is asked to return.
#[derive(Debug, Deserialize)]
struct GeneratedQuiz {
    questions: Vec<Question>,
}

/// Generates quizzes through a question provider.
pub struct QuizGenerator {
    provider: Arc<dyn QuestionProvider>,
    config: GeneratorConfig,
}

impl QuizGenerator {
    pub fn new(provider: Arc<dyn QuestionProvider>, config: GeneratorConfig) -> Self {
        Self { provider, config }
    }

    /// Generate a quiz for `settings`.
    pub async fn generate(&self, settings: &QuizSettings) -> Result<QuizSet> {
        settings.validate()?;

        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_prompt(settings),
            system_prompt: self.config.system_prompt_override.clone(),
            max_tokens: (BASE_TOKENS + TOKENS_PER_QUESTION * settings.total_questions)
                .min(MAX_TOKENS_CAP),
            temperature: self.config.temperature,
            json_mode: true,
        };

        tracing::info!(
            provider = self.provider.name(),
            model = %request.model,
            topic = %settings.topic,
            questions = settings.total_questions,
            difficulty = %settings.difficulty,
            "generating quiz"
        );

        let start = Instant::now();
        let mut last_error = None;
        let mut retry_delay = self.config.retry_delay;
        for retry in 0..=self.config.max_retries {
            if retry > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
            }

            let attempt = async {
                let response = self.provider.generate(&request).await?;
                parse_generated_quiz(&response.content, settings)
            };

            match attempt.await {
                Ok(set) => {
                    tracing::info!(
                        questions = set.questions.len(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "quiz generated"
                    );
                    return Ok(set);
                }
                Err(e) => {
                    if let Some(provider_error) = e.downcast_ref::<ProviderError>() {
                        if provider_error.is_permanent() {
                            return Err(e);
                        }
                        if let Some(ms) = provider_error.retry_after_ms() {
                            retry_delay = retry_delay.max(Duration::from_millis(ms));
                        }
                    }
                    tracing::warn!(retry, error = %e, "quiz generation attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow::anyhow!("no generation attempts were made"))
            .context(format!(
                "failed to generate quiz after {} attempts",
                self.config.max_retries + 1
            )))
    }
}

/// Build the user prompt for `settings`.
pub fn build_prompt(settings: &QuizSettings) -> String {
    format!(
        r#"Generate {count} multiple-choice questions about "{topic}" at {difficulty} difficulty level.

Requirements:
- Each question must have exactly 4 options (A, B, C, D)
- Only one option should be correct
- Provide detailed explanation for each question
- Questions should be clear and unambiguous
- For {difficulty} difficulty: {guidance}

Return ONLY a valid JSON object in this exact format:
{{
  "questions": [
    {{
      "id": 1,
      "question": "Question text here?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correct_answer": 0,
      "explanation": "Detailed explanation of why the answer is correct and why others are wrong"
    }}
  ]
}}"#,
        count = settings.total_questions,
        topic = settings.topic.trim(),
        difficulty = settings.difficulty,
        guidance = settings.difficulty.guidance(),
    )
}

/// Parse model output into a validated quiz. Question ids are renumbered
/// `1..=n` in the order the model returned them.
pub fn parse_generated_quiz(content: &str, settings: &QuizSettings) -> Result<QuizSet> {
    let json = extract_json_from_markdown(content);
    let generated: GeneratedQuiz =
        serde_json::from_str(&json).context("model response is not a valid quiz JSON object")?;

    let questions = generated
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, mut q)| {
            q.id = i as u32 + 1;
            q
        })
        .collect();

    let set = QuizSet {
        settings: settings.clone(),
        questions,
    };
    set.validate().context("model returned an unusable question set")?;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use crate::traits::{GenerateResponse, ModelInfo, TokenUsage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn quiz_json(n: usize) -> String {
        let questions: Vec<_> = (0..n)
            .map(|i| {
                serde_json::json!({
                    "id": 0,
                    "question": format!("Q{i}?"),
                    "options": ["a", "b", "c", "d"],
                    "correct_answer": i % 4,
                    "explanation": "because"
                })
            })
            .collect();
        serde_json::json!({ "questions": questions }).to_string()
    }

    /// Replays queued outcomes, then repeats the last one.
    struct ScriptedProvider {
        script: Mutex<Vec<Result<String, ProviderError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl QuestionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            *self.calls.lock().unwrap() += 1;
            let mut script = self.script.lock().unwrap();
            let next = if script.len() > 1 {
                script.remove(0)
            } else {
                match &script[0] {
                    Ok(s) => Ok(s.clone()),
                    Err(_) => Err(ProviderError::NetworkError("still down".into())),
                }
            };
            let content = next?;
            Ok(GenerateResponse {
                content,
                model: request.model.clone(),
                token_usage: TokenUsage::default(),
                latency_ms: 1,
            })
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    fn settings(n: u32) -> QuizSettings {
        QuizSettings::new("Photosynthesis", Difficulty::Hard, n)
    }

    fn fast_config() -> GeneratorConfig {
        GeneratorConfig {
            retry_delay: Duration::from_millis(10),
            ..Default::default()
        }
    }

    #[test]
    fn prompt_mentions_topic_count_and_guidance() {
        let prompt = build_prompt(&settings(7));
        assert!(prompt.contains("Generate 7 multiple-choice questions"));
        assert!(prompt.contains("\"Photosynthesis\""));
        assert!(prompt.contains("complex scenarios"));
        assert!(prompt.contains("\"correct_answer\": 0"));
    }

    #[test]
    fn parse_renumbers_and_validates() {
        let set = parse_generated_quiz(&quiz_json(3), &settings(3)).unwrap();
        let ids: Vec<u32> = set.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(set.settings.topic, "Photosynthesis");
    }

    #[test]
    fn parse_accepts_fenced_output() {
        let fenced = format!("```json\n{}\n```", quiz_json(2));
        assert!(parse_generated_quiz(&fenced, &settings(2)).is_ok());
    }

    #[test]
    fn parse_rejects_wrong_count() {
        let err = parse_generated_quiz(&quiz_json(4), &settings(5)).unwrap_err();
        assert!(format!("{err:#}").contains("expected 5 questions, got 4"));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::Timeout(120)),
            Ok("not json at all".into()),
            Ok(quiz_json(2)),
        ]));
        let generator = QuizGenerator::new(provider.clone(), fast_config());

        let set = generator.generate(&settings(2)).await.unwrap();
        assert_eq!(set.questions.len(), 2);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_permanent_failure() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::AuthenticationFailed("bad key".into())),
            Ok(quiz_json(2)),
        ]));
        let generator = QuizGenerator::new(provider.clone(), fast_config());

        let err = generator.generate(&settings(2)).await.unwrap_err();
        assert!(err.to_string().contains("authentication failed"));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(
            ProviderError::NetworkError("down".into()),
        )]));
        let config = GeneratorConfig {
            max_retries: 2,
            ..fast_config()
        };
        let generator = QuizGenerator::new(provider.clone(), config);

        let err = generator.generate(&settings(2)).await.unwrap_err();
        assert!(err.to_string().contains("after 3 attempts"));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn invalid_settings_fail_before_calling_provider() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(quiz_json(1))]));
        let generator = QuizGenerator::new(provider.clone(), fast_config());

        let mut bad = settings(1);
        bad.total_questions = 0;
        assert!(generator.generate(&bad).await.is_err());
        assert_eq!(provider.calls(), 0);
    }
}
