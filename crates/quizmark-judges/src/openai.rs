//! OpenAI judge implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizmark_core::error::JudgeError;
use quizmark_core::judge::{build_evaluation_prompt, parse_verdict, Judge, LlmEvaluation};
use quizmark_core::model::FreeTextQuestion;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const EVAL_TEMPERATURE: f64 = 0.3;

/// OpenAI-compatible chat-completions judge.
pub struct OpenAiJudge {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiJudge {
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
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiJudge {
    async fn post_chat(&self, body: &ChatRequest) -> Result<reqwest::Response, JudgeError> {
        self.client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
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

#[async_trait]
impl Judge for OpenAiJudge {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, question, user_answer), fields(model = %self.model))]
    async fn evaluate(
        &self,
        question: &FreeTextQuestion,
        user_answer: &str,
        language: &str,
    ) -> Result<LlmEvaluation, JudgeError> {
        let prompt = build_evaluation_prompt(question, user_answer, language);

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: EVAL_TEMPERATURE,
            max_tokens: None,
            response_format: Some(ResponseFormat {
                kind: "json_object".to_string(),
            }),
        };

        let response = self.post_chat(&body).await?;

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
            return Err(JudgeError::Api {
                status,
                message: body,
            });
        }

        let api_response: ChatResponse = response.json().await.map_err(|e| {
            JudgeError::MalformedVerdict(format!("unexpected response shape: {e}"))
        })?;

        let content = api_response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| JudgeError::MalformedVerdict("empty completion".into()))?;

        parse_verdict(content)
    }

    async fn test_connection(&self) -> bool {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "test".to_string(),
            }],
            temperature: 0.0,
            max_tokens: Some(5),
            response_format: None,
        };

        match self.post_chat(&body).await {
            Ok(response) => response.status().as_u16() == 200,
            Err(e) => {
                tracing::debug!("openai connection test failed: {e}");
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
            "choices": [{"message": {"content": "{\"score\": 90, \"explanation\": \"Right city.\", \"expectedAnswer\": \"Paris\"}", "role": "assistant"}, "index": 0}],
            "model": "gpt-4o-mini"
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let judge = OpenAiJudge::new("test-key", "gpt-4o-mini", Some(server.uri()));
        let verdict = judge
            .evaluate(&question(), "Paris, I think", "English")
            .await
            .unwrap();
        assert!((verdict.score - 90.0).abs() < f64::EPSILON);
        assert_eq!(verdict.expected_answer, "Paris");
    }

    #[tokio::test]
    async fn out_of_range_score_is_clamped() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [{"message": {"content": "{\"score\": 140, \"explanation\": \"x\", \"expectedAnswer\": \"y\"}", "role": "assistant"}, "index": 0}],
            "model": "gpt-4o-mini"
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let judge = OpenAiJudge::new("key", "gpt-4o-mini", Some(server.uri()));
        let verdict = judge.evaluate(&question(), "Paris", "English").await.unwrap();
        assert!((verdict.score - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let judge = OpenAiJudge::new("bad-key", "gpt-4o-mini", Some(server.uri()));
        let err = judge.evaluate(&question(), "Paris", "English").await.unwrap_err();
        assert!(matches!(err, JudgeError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn server_error_carries_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let judge = OpenAiJudge::new("key", "gpt-4o-mini", Some(server.uri()));
        let err = judge.evaluate(&question(), "Paris", "English").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn non_json_completion_is_malformed() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [{"message": {"content": "It's Paris, obviously.", "role": "assistant"}, "index": 0}],
            "model": "gpt-4o-mini"
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let judge = OpenAiJudge::new("key", "gpt-4o-mini", Some(server.uri()));
        let err = judge.evaluate(&question(), "Paris", "English").await.unwrap_err();
        assert!(matches!(err, JudgeError::MalformedVerdict(_)));
    }

    #[tokio::test]
    async fn empty_choices_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": [], "model": "gpt-4o-mini"})),
            )
            .mount(&server)
            .await;

        let judge = OpenAiJudge::new("key", "gpt-4o-mini", Some(server.uri()));
        let err = judge.evaluate(&question(), "Paris", "English").await.unwrap_err();
        assert!(matches!(err, JudgeError::MalformedVerdict(_)));
    }

    #[tokio::test]
    async fn connection_test_reduces_to_bool() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"choices": [{"message": {"content": "ok", "role": "assistant"}, "index": 0}]}),
            ))
            .mount(&server)
            .await;

        let judge = OpenAiJudge::new("key", "gpt-4o-mini", Some(server.uri()));
        assert!(judge.test_connection().await);

        let failing = OpenAiJudge::new("key", "gpt-4o-mini", Some("http://127.0.0.1:9".into()));
        assert!(!failing.test_connection().await);
    }
}
