//! Error types for quiz input, in-session operations, and providers.
//!
//! `QuizError` is fatal: a session is never created from input that fails
//! validation. `SessionError` is local to a single operation and leaves the
//! session untouched. `ProviderError` lives here so the generator can
//! downcast and classify failures for retry decisions without string
//! matching.

use thiserror::Error;

/// Malformed question set or settings handed to `QuizSession::start`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuizError {
    #[error("question set is empty")]
    EmptyQuestionSet,

    #[error("expected {expected} questions, got {actual}")]
    QuestionCountMismatch { expected: usize, actual: usize },

    #[error("question {question_id} has {count} options, expected {expected}")]
    InvalidOptionCount {
        question_id: u32,
        count: usize,
        expected: usize,
    },

    #[error("question {question_id} marks option {index} as correct, expected 0..{options}")]
    InvalidCorrectOption {
        question_id: u32,
        index: usize,
        options: usize,
    },

    #[error("invalid quiz settings: {0}")]
    InvalidSettings(String),
}

/// A rejected operation on an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("option {index} is out of range (question has {options} options)")]
    OptionOutOfRange { index: usize, options: usize },

    #[error("question {index} is out of range (quiz has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}
