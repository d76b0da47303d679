//! Ollama (local LLM) judge implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizmark_core::error::JudgeError;
use quizmark_core::judge::{build_evaluation_prompt, parse_verdict, Judge, LlmEvaluation};
use quizmark_core::model::FreeTextQuestion;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 300; // Local models are slower

/// Ollama local-generation judge.
pub struct OllamaJudge {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaJudge {
    pub fn new(base_url: &str, model: &str) -> Self {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    format: String,
}

/// The generation endpoint returns a single string field that itself
/// contains the structured verdict.
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl Judge for OllamaJudge {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, question, user_answer), fields(model = %self.model))]
    async fn evaluate(
        &self,
        question: &FreeTextQuestion,
        user_answer: &str,
        language: &str,
    ) -> Result<LlmEvaluation, JudgeError> {
        let prompt = build_evaluation_prompt(question, user_answer, language);

        let body = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            format: "json".to_string(),
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JudgeError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else if e.is_connect() {
                    JudgeError::Network(format!(
                        "Ollama not reachable at {}. Is it running? Start with: ollama serve",
                        self.base_url
                    ))
                } else {
                    JudgeError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(JudgeError::ModelNotFound(format!(
                "Model '{}' not found locally. Pull it with: ollama pull {}",
                self.model, self.model
            )));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::Api {
                status,
                message: body,
            });
        }

        let api_response: GenerateResponse = response.json().await.map_err(|e| {
            JudgeError::MalformedVerdict(format!("unexpected response shape: {e}"))
        })?;

        parse_verdict(&api_response.response)
    }

    async fn test_connection(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await;

        match result {
            Ok(response) => response.status().as_u16() == 200,
            Err(e) => {
                tracing::debug!("ollama connection test failed: {e}");
                false
            }
        }
    }
}
