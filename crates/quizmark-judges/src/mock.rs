//! Mock judge for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizmark_core::error::JudgeError;
use quizmark_core::judge::{Judge, LlmEvaluation};
use quizmark_core::model::FreeTextQuestion;

/// A mock judge for testing the evaluation pipeline without API calls.
///
/// Returns configurable verdicts based on user-answer substring matching.
pub struct MockJudge {
    /// Map of user-answer substring → verdict.
    verdicts: HashMap<String, LlmEvaluation>,
    /// Default verdict if no answer matches.
    default_verdict: LlmEvaluation,
    /// Scripted failure message; when set, every call fails.
    failure: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last (user answer, language) pair received.
    last_call: Mutex<Option<(String, String)>>,
}

impl MockJudge {
    /// Create a mock with the given answer-substring → verdict mappings.
    pub fn new(verdicts: HashMap<String, LlmEvaluation>) -> Self {
        Self {
            verdicts,
            default_verdict: default_verdict(),
            failure: None,
            call_count: AtomicU32::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same verdict.
    pub fn with_fixed_verdict(verdict: LlmEvaluation) -> Self {
        Self {
            verdicts: HashMap::new(),
            default_verdict: verdict,
            failure: None,
            call_count: AtomicU32::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// Create a mock whose every evaluation fails with a malformed verdict.
    pub fn failing(message: &str) -> Self {
        Self {
            verdicts: HashMap::new(),
            default_verdict: default_verdict(),
            failure: Some(message.to_string()),
            call_count: AtomicU32::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// Number of evaluate calls made against this judge.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last (user answer, language) pair seen.
    pub fn last_call(&self) -> Option<(String, String)> {
        self.last_call.lock().unwrap().clone()
    }
}

fn default_verdict() -> LlmEvaluation {
    LlmEvaluation {
        score: 50.0,
        explanation: "Partially correct.".into(),
        expected_answer: "The expected answer.".into(),
    }
}

#[async_trait]
impl Judge for MockJudge {
    fn name(&self) -> &str {
        "mock"
    }

    async fn evaluate(
        &self,
        _question: &FreeTextQuestion,
        user_answer: &str,
        language: &str,
    ) -> Result<LlmEvaluation, JudgeError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_call.lock().unwrap() = Some((user_answer.to_string(), language.to_string()));

        if let Some(message) = &self.failure {
            return Err(JudgeError::MalformedVerdict(message.clone()));
        }

        Ok(self
            .verdicts
            .iter()
            .find(|(key, _)| user_answer.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_verdict.clone()))
    }

    async fn test_connection(&self) -> bool {
        self.failure.is_none()
    }
}
