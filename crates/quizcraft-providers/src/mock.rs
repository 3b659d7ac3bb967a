//! Mock provider for testing and offline use.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizcraft_core::traits::{
    GenerateRequest, GenerateResponse, ModelInfo, QuestionProvider, TokenUsage,
};

/// A mock LLM provider that never leaves the process.
///
/// With no fixed response it answers generation prompts with placeholder
/// questions: as many as the prompt asks for, about the quoted topic, with
/// the correct answer cycling through A..D.
pub struct MockProvider {
    fixed_response: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            fixed_response: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            fixed_response: Some(response.to_string()),
            ..Self::new()
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Question count requested by a generation prompt ("Generate N ...").
fn requested_count(prompt: &str) -> usize {
    prompt
        .split_once("Generate ")
        .map(|(_, rest)| {
            rest.chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
        })
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(1)
}

/// First double-quoted span in the prompt.
fn requested_topic(prompt: &str) -> &str {
    prompt
        .split('"')
        .nth(1)
        .filter(|t| !t.is_empty())
        .unwrap_or("general knowledge")
}

fn placeholder_quiz(prompt: &str) -> String {
    let topic = requested_topic(prompt);
    let questions: Vec<_> = (0..requested_count(prompt))
        .map(|i| {
            serde_json::json!({
                "id": i + 1,
                "question": format!("Placeholder question {} about {}?", i + 1, topic),
                "options": ["First", "Second", "Third", "Fourth"],
                "correct_answer": i % 4,
                "explanation": format!("Option {} is correct for this placeholder.", i % 4 + 1),
            })
        })
        .collect();
    serde_json::json!({ "questions": questions }).to_string()
}

#[async_trait]
impl QuestionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        let content = match &self.fixed_response {
            Some(response) => response.clone(),
            None => placeholder_quiz(&request.prompt),
        };
        let token_count = (content.len() / 4) as u32; // Rough estimate

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens: (request.prompt.len() / 4) as u32,
                completion_tokens: token_count,
                total_tokens: (request.prompt.len() / 4) as u32 + token_count,
                estimated_cost_usd: 0.0,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
            cost_per_1k_input: 0.0,
            cost_per_1k_output: 0.0,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizcraft_core::generator::{build_prompt, parse_generated_quiz};
    use quizcraft_core::model::{Difficulty, QuizSettings};

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock-model".into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 100,
            temperature: 0.0,
            json_mode: true,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("{\"questions\": []}");
        let response = provider.generate(&request("anything")).await.unwrap();
        assert_eq!(response.content, "{\"questions\": []}");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn placeholder_quiz_matches_the_prompt() {
        let settings = QuizSettings::new("Tides", Difficulty::Easy, 6);
        let provider = MockProvider::new();

        let response = provider
            .generate(&request(&build_prompt(&settings)))
            .await
            .unwrap();
        let set = parse_generated_quiz(&response.content, &settings).unwrap();

        assert_eq!(set.questions.len(), 6);
        assert!(set.questions[0].text.contains("Tides"));
        assert_eq!(set.questions[5].correct_option, 1);
    }

    #[test]
    fn prompt_parsing_fallbacks() {
        assert_eq!(requested_count("no count here"), 1);
        assert_eq!(requested_count("Generate 12 multiple-choice"), 12);
        assert_eq!(requested_topic("no quotes"), "general knowledge");
    }
}
