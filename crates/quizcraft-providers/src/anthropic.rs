//! Anthropic Messages API provider.
//!
//! The Messages API has no JSON response mode, so `json_mode` requests get
//! an extra instruction appended to the system prompt, and the reply is
//! assembled from every `text` content block.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizcraft_core::traits::{
    GenerateRequest, GenerateResponse, ModelInfo, QuestionProvider, TokenUsage,
    DEFAULT_SYSTEM_PROMPT,
};

use crate::http;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const JSON_ONLY_SUFFIX: &str = "\n\nRespond with the JSON object only, without markdown fences.";

/// USD per million input / output tokens (Claude Sonnet).
const PRICE_PER_M_INPUT: f64 = 3.0;
const PRICE_PER_M_OUTPUT: f64 = 15.0;

pub struct AnthropicProvider {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        let base_url = base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            api_key: api_key.to_string(),
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
            client: http::client()?,
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: String,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> MessagesRequest<'a> {
    fn from_generate(request: &'a GenerateRequest) -> Self {
        let mut system = request
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
            .to_string();
        if request.json_mode {
            system.push_str(JSON_ONLY_SUFFIX);
        }
        Self {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system,
            messages: [UserMessage {
                role: "user",
                content: &request.prompt,
            }],
        }
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl From<&Usage> for TokenUsage {
    fn from(usage: &Usage) -> Self {
        TokenUsage {
            prompt_tokens: usage.input_tokens,
            completion_tokens: usage.output_tokens,
            total_tokens: usage.input_tokens + usage.output_tokens,
            estimated_cost_usd: (f64::from(usage.input_tokens) * PRICE_PER_M_INPUT
                + f64::from(usage.output_tokens) * PRICE_PER_M_OUTPUT)
                / 1_000_000.0,
        }
    }
}

#[async_trait]
impl QuestionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&MessagesRequest::from_generate(request))
            .send()
            .await
            .map_err(http::send_error)?;
        let response = http::check_status(response, &request.model).await?;
        let body: MessagesResponse = http::read_json(response).await?;

        let content: String = body
            .content
            .iter()
            .filter(|block| block.kind.is_empty() || block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();

        Ok(GenerateResponse {
            content,
            model: body.model,
            token_usage: TokenUsage::from(&body.usage),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        [
            ("claude-sonnet-4-20250514", "Claude Sonnet 4", 0.003, 0.015),
            ("claude-haiku-4-5-20251001", "Claude Haiku 4.5", 0.0008, 0.004),
        ]
        .into_iter()
        .map(|(id, name, input, output)| ModelInfo {
            id: id.into(),
            name: name.into(),
            provider: "anthropic".into(),
            max_context: 200_000,
            cost_per_1k_input: input,
            cost_per_1k_output: output,
        })
        .collect()
    }
}
