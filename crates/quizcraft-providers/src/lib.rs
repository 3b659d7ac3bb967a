//! quizcraft-providers: LLM question providers.
//!
//! Implements the `QuestionProvider` trait for OpenAI and Anthropic, plus an
//! offline mock, and loads provider configuration.

pub mod anthropic;
pub mod config;
mod http;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, ApiKey, ProviderConfig, QuizcraftConfig};
pub use quizcraft_core::error::ProviderError;
