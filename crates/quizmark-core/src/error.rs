//! Evaluation error types.
//!
//! Defined in `quizmark-core` so callers can classify judge failures without
//! string matching. `test_connection` is the only judge operation that
//! swallows errors; everything else propagates through these types.

use thiserror::Error;

/// Errors from an LLM judge call.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned a non-success response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The judge's output could not be coerced into a verdict. The raw
    /// output is never silently defaulted into a score.
    #[error("malformed verdict: {0}")]
    MalformedVerdict(String),
}

/// Errors from evaluating a single answer.
#[derive(Debug, Error)]
pub enum EvaluateError {
    /// A free-text question was evaluated without a configured judge.
    /// Caller precondition, not a retryable condition.
    #[error("a configured judge is required for free-text questions")]
    JudgeRequired,

    /// The judge call failed. Carries the provider name so the surfaced
    /// message identifies the failing stage.
    #[error("{provider} evaluation failed: {source}")]
    Judge {
        provider: String,
        #[source]
        source: JudgeError,
    },

    /// The user answer's shape does not match the question kind. Indicates a
    /// contract violation upstream, not a user mistake.
    #[error("user answer shape does not match {kind} question")]
    AnswerShape { kind: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judge_error_messages_carry_status() {
        let err = JudgeError::Api {
            status: 500,
            message: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 500): overloaded");
    }

    #[test]
    fn evaluate_error_names_the_provider() {
        let err = EvaluateError::Judge {
            provider: "anthropic".into(),
            source: JudgeError::Timeout(120),
        };
        let message = err.to_string();
        assert!(message.contains("anthropic"));
        assert!(message.contains("timed out"));
    }
}
