//! Chat-completions transport for OpenAI-compatible services.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::transport::{GenerationRequest, Transport};
use crate::error::{CoachError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 500;

const SYSTEM_MESSAGE: &str =
    "You are an assistant that helps people reach their goals. Always answer with a single JSON object.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Either a free-form JSON object or one matching the contract's schema.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat<'a> {
    JsonObject,
    JsonSchema { json_schema: JsonSchemaFormat<'a> },
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'static str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// Transport posting to `{api_base}/chat/completions`.
///
/// A missing API key is only reported when a call is made, so the coach can
/// start and serve commands that never need generation.
///
/// Replies are constrained to the request's JSON Schema unless
/// [`with_structured_replies(false)`](Self::with_structured_replies) is set
/// for services that only understand `json_object`.
pub struct OpenAiTransport {
    api_key: Option<String>,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    structured_replies: bool,
    client: reqwest::Client,
}

impl OpenAiTransport {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            structured_replies: true,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_structured_replies(mut self, structured: bool) -> Self {
        self.structured_replies = structured;
        self
    }

    /// Socket-level timeout; the gateway applies its own bound on top.
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    fn chat_request<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        let response_format = if self.structured_replies {
            ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: request.kind.template_name(),
                    schema: &request.schema,
                    strict: false,
                },
            }
        } else {
            ResponseFormat::JsonObject
        };

        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: &request.instruction,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format,
        }
    }
}

#[async_trait]
impl Transport for OpenAiTransport {
    async fn complete(&self, request: &GenerationRequest) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CoachError::Transport {
                message: "API key is not set".to_string(),
            });
        };

        let body = self.chat_request(request);

        let url = self.endpoint();
        debug!("POST {url} ({}, model {})", request.kind.as_str(), self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoachError::Transport {
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        debug!("HTTP {status} from {url}");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoachError::Transport {
                message: format!("service returned {status}: {body}"),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| CoachError::Transport {
            message: format!("malformed response body: {e}"),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CoachError::Transport {
                message: "response contained no choices".to_string(),
            })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::gateway::transport::RequestKind;

    #[tokio::test]
    async fn test_missing_api_key_fails_at_call_time() {
        let transport = OpenAiTransport::new(Some("   ".to_string()));
        let request = GenerationRequest {
            kind: RequestKind::TitleGeneration,
            instruction: "Title please".to_string(),
            schema: json!({}),
        };
        let err = transport.complete(&request).await.unwrap_err();
        assert!(matches!(err, CoachError::Transport { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let transport = OpenAiTransport::new(None).with_api_base("http://localhost:8080/v1/");
        assert_eq!(transport.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    fn title_request() -> GenerationRequest {
        GenerationRequest {
            kind: RequestKind::TitleGeneration,
            instruction: "Title please".to_string(),
            schema: json!({"type": "object", "required": ["title"]}),
        }
    }

    #[test]
    fn test_request_body_carries_reply_schema() {
        let transport = OpenAiTransport::new(Some("key".to_string()));
        let request = title_request();
        let value = serde_json::to_value(transport.chat_request(&request)).unwrap();

        assert_eq!(value["response_format"]["type"], "json_schema");
        let format = &value["response_format"]["json_schema"];
        assert_eq!(format["name"], "title_generation");
        assert_eq!(format["schema"], request.schema);
        assert_eq!(format["strict"], false);
        assert_eq!(value["max_tokens"], 500);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "Title please");
    }

    #[test]
    fn test_request_body_without_structured_replies() {
        let transport = OpenAiTransport::new(None).with_structured_replies(false);
        let request = title_request();
        let value = serde_json::to_value(transport.chat_request(&request)).unwrap();
        assert_eq!(value["response_format"], json!({"type": "json_object"}));
    }
}
