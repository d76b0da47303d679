//! The judge contract for free-text grading.
//!
//! Any LLM backend that grades free-text answers implements [`Judge`]. The
//! grading prompt and the verdict coercion live here, shared by every
//! implementation, so providers cannot diverge on the rubric, the response
//! language, or how leniently malformed output is treated.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::JudgeError;
use crate::model::FreeTextQuestion;

/// A judge's verdict on a free-text answer.
///
/// The score should be 0–100 but is not bounded by the judge itself; it is
/// clamped before use. Explanation and expected answer are in the quiz's
/// configured response language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmEvaluation {
    pub score: f64,
    pub explanation: String,
    pub expected_answer: String,
}

/// Trait for LLM backends that grade free-text answers.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Human-readable provider name (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Grade a free-text answer against the question's reference answer.
    async fn evaluate(
        &self,
        question: &FreeTextQuestion,
        user_answer: &str,
        language: &str,
    ) -> Result<LlmEvaluation, JudgeError>;

    /// Probe the backend with a minimal request. Any failure reduces to
    /// `false`; never used for scoring.
    async fn test_connection(&self) -> bool;
}

/// Build the grading prompt for a free-text answer.
///
/// Shared by all judge implementations: the output-language directive, the
/// three-field response shape, and the scoring rubric must not vary per
/// provider.
pub fn build_evaluation_prompt(
    question: &FreeTextQuestion,
    user_answer: &str,
    language: &str,
) -> String {
    let context = question
        .context
        .as_ref()
        .map(|c| format!("Additional Context: {c}\n\n"))
        .unwrap_or_default();

    format!(
        r#"You are an expert quiz evaluator. Evaluate the following answer.

IMPORTANT: You MUST respond entirely in {language}.

Question: {question}

Expected Answer: {answer}

{context}User's Answer: {user_answer}

Evaluate and respond with this exact JSON format:
{{
    "score": <number 0-100>,
    "explanation": "<brief feedback in {language}, 1-2 sentences max>",
    "expectedAnswer": "<the correct answer in {language}, concise>"
}}

Scoring guidelines:
- 100: Perfect or near-perfect answer
- 70-99: Good answer with minor issues
- 40-69: Partial understanding, missing key elements
- 0-39: Incorrect or very incomplete

CRITICAL:
- Respond ONLY with JSON, no other text
- Keep explanation SHORT (1-2 sentences)
- expectedAnswer should be the ANSWER only, not your reasoning
- Everything must be in {language}"#,
        question = question.prompt,
        answer = question.answer,
    )
}

/// Coerce a judge's raw text output into a verdict.
///
/// Strips one optional fenced code block (```json or a bare fence) around
/// the payload, decodes the three named fields, and clamps the score into
/// [0, 100]. Any shape deviation is a [`JudgeError::MalformedVerdict`].
pub fn parse_verdict(raw: &str) -> Result<LlmEvaluation, JudgeError> {
    let payload = strip_code_fence(raw);
    if payload.is_empty() {
        return Err(JudgeError::MalformedVerdict("empty response".into()));
    }

    let mut verdict: LlmEvaluation = serde_json::from_str(payload)
        .map_err(|e| JudgeError::MalformedVerdict(format!("invalid verdict JSON: {e}")))?;
    verdict.score = verdict.score.clamp(0.0, 100.0);
    Ok(verdict)
}

/// Strip a single surrounding fenced code block, if present.
///
/// Handles a labeled opening fence (```json), an unlabeled one, and a
/// truncated response missing the closing fence.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(newline) = rest.find('\n') else {
        return trimmed;
    };
    let body = rest[newline + 1..].trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}
