use crate::config::Config;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Header carrying the per-request session id to the provider
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Instructions for one chat completion: a system framing plus the user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Failed to send request to LLM API: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("LLM API request timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse LLM API response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("LLM API response contained no reply text")]
    EmptyReply,
}

/// Text in, text out. Implementations must not retry.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &ChatPrompt, session_id: &str) -> Result<String, LlmError>;
}

/// OpenAI Chat Completion request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for any OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            api_url: config.llm_api_url.clone(),
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
            max_tokens: config.llm_max_tokens,
            timeout: config.llm_timeout(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, prompt: &ChatPrompt, session_id: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header(SESSION_HEADER, session_id)
            .json(&request)
            .send()
            .await
            .map_err(LlmError::Transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(LlmError::Status { status, body });
        }

        let chat_response: ChatResponse = response.json().await.map_err(LlmError::Decode)?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyReply)
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, prompt: &ChatPrompt, session_id: &str) -> Result<String, LlmError> {
        debug!(
            "Sending chat completion to {} (model {}, max_tokens {})",
            self.api_url, self.model, self.max_tokens
        );

        match tokio::time::timeout(self.timeout, self.send(prompt, session_id)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn create_client(api_url: &str, timeout_secs: u64) -> OpenAiClient {
        OpenAiClient {
            http: reqwest::Client::new(),
            api_url: api_url.to_string(),
            api_key: "test-llm-key".to_string(),
            model: "gemini-2.0-flash".to_string(),
            max_tokens: 2048,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn create_prompt() -> ChatPrompt {
        ChatPrompt {
            system: "You are an expert translator.".to_string(),
            user: "Translate this text: 'What's up?'".to_string(),
        }
    }

    fn create_chat_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1705312200,
            "model": "gemini-2.0-flash",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": content
                    },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    // ==================== Serialization Tests ====================

    #[test]
    fn test_chat_request_serialization() {
        let prompt = create_prompt();
        let request = ChatRequest {
            model: "gemini-2.0-flash",
            messages: vec![
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: 2048,
        };

        let json = serde_json::to_value(&request).expect("Should serialize");
        assert_eq!(json["model"], "gemini-2.0-flash");
        assert_eq!(json["max_tokens"], 2048);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Translate this text: 'What's up?'");
    }

    #[test]
    fn test_chat_response_null_content() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).expect("Should deserialize");
        assert!(response.choices[0].message.content.is_none());
    }

    #[test]
    fn test_new_reads_config() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8001,
            database_url: None,
            llm_api_key: "key".to_string(),
            llm_api_url: "http://localhost/v1/chat/completions".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
            llm_max_tokens: 512,
            llm_timeout_secs: 7,
            history_default_limit: 20,
            history_max_limit: 100,
        };

        let client = OpenAiClient::new(reqwest::Client::new(), &config);
        assert_eq!(client.model(), "gpt-4o-mini");
        assert_eq!(client.max_tokens, 512);
        assert_eq!(client.timeout, Duration::from_secs(7));
    }

    // ==================== complete() Tests ====================

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-llm-key"))
            .and(header(SESSION_HEADER, "session-1"))
            .and(body_partial_json(serde_json::json!({
                "model": "gemini-2.0-flash",
                "max_tokens": 2048
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_chat_response("{\"main_translation\": \"Naber?\"}")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_client(&format!("{}/v1/chat/completions", mock_server.uri()), 5);
        let reply = client
            .complete(&create_prompt(), "session-1")
            .await
            .expect("Should succeed");

        assert_eq!(reply, "{\"main_translation\": \"Naber?\"}");
    }

    #[tokio::test]
    async fn test_complete_api_error_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_client(&format!("{}/v1/chat/completions", mock_server.uri()), 5);
        let err = client
            .complete(&create_prompt(), "session-1")
            .await
            .expect_err("Should fail");

        match &err {
            LlmError::Status { status, body } => {
                assert_eq!(*status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "Service Unavailable");
            }
            other => panic!("Unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&mock_server)
            .await;

        let client = create_client(&format!("{}/v1/chat/completions", mock_server.uri()), 5);
        let err = client
            .complete(&create_prompt(), "s")
            .await
            .expect_err("Should fail");

        assert!(matches!(err, LlmError::EmptyReply));
    }

    #[tokio::test]
    async fn test_complete_blank_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_chat_response("  \n")))
            .mount(&mock_server)
            .await;

        let client = create_client(&format!("{}/v1/chat/completions", mock_server.uri()), 5);
        let err = client
            .complete(&create_prompt(), "s")
            .await
            .expect_err("Should fail");

        assert!(matches!(err, LlmError::EmptyReply));
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = create_client(&format!("{}/v1/chat/completions", mock_server.uri()), 5);
        let err = client
            .complete(&create_prompt(), "s")
            .await
            .expect_err("Should fail");

        assert!(matches!(err, LlmError::Decode(_)));
    }

    #[tokio::test]
    async fn test_complete_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_chat_response("late"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let client = create_client(&format!("{}/v1/chat/completions", mock_server.uri()), 1);
        let err = client
            .complete(&create_prompt(), "s")
            .await
            .expect_err("Should time out");

        assert!(matches!(err, LlmError::Timeout(d) if d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_complete_unreachable_host() {
        // Port 9 (discard) is not listening on test machines
        let client = create_client("http://127.0.0.1:9/v1/chat/completions", 5);
        let err = client
            .complete(&create_prompt(), "s")
            .await
            .expect_err("Should fail");

        assert!(matches!(err, LlmError::Transport(_)));
    }
}
