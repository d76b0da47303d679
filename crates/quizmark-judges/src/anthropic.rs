//! Anthropic judge implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizmark_core::error::JudgeError;
use quizmark_core::judge::{build_evaluation_prompt, parse_verdict, Judge, LlmEvaluation};
use quizmark_core::model::FreeTextQuestion;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const EVAL_TEMPERATURE: f64 = 0.3;
const EVAL_MAX_TOKENS: u32 = 1024;

/// Anthropic messages-API judge.
pub struct AnthropicJudge {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicJudge {
    pub fn new(api_key: &str, model: &str, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        }
    }

    async fn post_messages(&self, body: &MessagesRequest) -> Result<reqwest::Response, JudgeError> {
        self.client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JudgeError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    JudgeError::Network(e.to_string())
                }
            })
    }
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

/// A response content block. Blocks other than `type: "text"` are skipped.
#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[async_trait]
impl Judge for AnthropicJudge {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, question, user_answer), fields(model = %self.model))]
    async fn evaluate(
        &self,
        question: &FreeTextQuestion,
        user_answer: &str,
        language: &str,
    ) -> Result<LlmEvaluation, JudgeError> {
        let prompt = build_evaluation_prompt(question, user_answer, language);

        let body = MessagesRequest {
            model: self.model.clone(),
            max_tokens: EVAL_MAX_TOKENS,
            temperature: EVAL_TEMPERATURE,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self.post_messages(&body).await?;

        let status = response.status().as_u16();
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::AuthenticationFailed(body));
        }
        if status == 404 {
            return Err(JudgeError::ModelNotFound(self.model.clone()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(JudgeError::Api { status, message });
        }

        let api_response: MessagesResponse = response.json().await.map_err(|e| {
            JudgeError::MalformedVerdict(format!("unexpected response shape: {e}"))
        })?;

        let text_block = api_response
            .content
            .iter()
            .find(|block| block.kind == "text")
            .ok_or_else(|| JudgeError::MalformedVerdict("no text content block".into()))?;

        parse_verdict(&text_block.text)
    }

    async fn test_connection(&self) -> bool {
        let body = MessagesRequest {
            model: self.model.clone(),
            max_tokens: 10,
            temperature: 0.0,
            messages: vec![Message {
                role: "user".to_string(),
                content: "test".to_string(),
            }],
        };

        match self.post_messages(&body).await {
            Ok(response) => response.status().as_u16() == 200,
            Err(e) => {
                tracing::debug!("anthropic connection test failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn question() -> FreeTextQuestion {
        FreeTextQuestion {
            prompt: "What is the capital of France?".into(),
            answer: "Paris".into(),
            context: None,
            weight: 1.0,
        }
    }

    #[tokio::test]
    async fn successful_evaluation() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "content": [{"type": "text", "text": "{\"score\": 95, \"explanation\": \"Correct.\", \"expectedAnswer\": \"Paris\"}"}],
            "model": "claude-3-5-sonnet-20241022"
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let judge = AnthropicJudge::new("test-key", "claude-3-5-sonnet-20241022", Some(server.uri()));
        let verdict = judge.evaluate(&question(), "Paris", "English").await.unwrap();
        assert!((verdict.score - 95.0).abs() < f64::EPSILON);
        assert_eq!(verdict.explanation, "Correct.");
    }

    #[tokio::test]
    async fn fenced_verdict_is_unwrapped() {
        let server = MockServer::start().await;

        let fenced = "```json\n{\"score\": 60, \"explanation\": \"Partial.\", \"expectedAnswer\": \"Paris\"}\n```";
        let response_body = serde_json::json!({
            "content": [{"type": "text", "text": fenced}],
            "model": "claude-3-5-sonnet-20241022"
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let judge = AnthropicJudge::new("key", "claude-3-5-sonnet-20241022", Some(server.uri()));
        let verdict = judge.evaluate(&question(), "Paris?", "English").await.unwrap();
        assert!((verdict.score - 60.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn skips_non_text_blocks() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "{\"score\": 80, \"explanation\": \"Ok.\", \"expectedAnswer\": \"Paris\"}"}
            ],
            "model": "claude-3-5-sonnet-20241022"
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let judge = AnthropicJudge::new("key", "claude-3-5-sonnet-20241022", Some(server.uri()));
        let verdict = judge.evaluate(&question(), "Paris", "English").await.unwrap();
        assert!((verdict.score - 80.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn no_text_block_is_malformed() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "content": [{"type": "tool_use", "id": "x", "name": "t", "input": {}}],
            "model": "claude-3-5-sonnet-20241022"
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let judge = AnthropicJudge::new("key", "claude-3-5-sonnet-20241022", Some(server.uri()));
        let err = judge.evaluate(&question(), "Paris", "English").await.unwrap_err();
        assert!(matches!(err, JudgeError::MalformedVerdict(_)));
    }

    #[tokio::test]
    async fn api_error_message_is_extracted() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_json(&error_body))
            .mount(&server)
            .await;

        let judge = AnthropicJudge::new("key", "claude-3-5-sonnet-20241022", Some(server.uri()));
        let err = judge.evaluate(&question(), "Paris", "English").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("529"));
        assert!(message.contains("Overloaded"));
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let judge = AnthropicJudge::new("bad-key", "claude-3-5-sonnet-20241022", Some(server.uri()));
        let err = judge.evaluate(&question(), "Paris", "English").await.unwrap_err();
        assert!(matches!(err, JudgeError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn connection_test_swallows_failures() {
        let judge = AnthropicJudge::new("key", "claude-3-5-sonnet-20241022", Some("http://127.0.0.1:9".into()));
        assert!(!judge.test_connection().await);
    }
}
