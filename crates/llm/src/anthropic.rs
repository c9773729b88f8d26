//! Anthropic Claude Provider
//!
//! Implementation of the LlmProvider trait for Anthropic's Messages API.

use std::time::Duration;

use async_trait::async_trait;
use backoff::{future::retry, Error as BackoffError, ExponentialBackoff};
use serde::Deserialize;
use tracing::{debug, warn};

use super::http_client::build_http_client;
use super::provider::{missing_api_key_error, parse_http_error, LlmProvider};
use super::types::{
    LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, MessageContent, MessageRole,
    ProviderConfig, StopReason, ToolChoice, ToolDefinition, UsageStats,
};

/// Default Anthropic API endpoint
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Current API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider
pub struct AnthropicProvider {
    config: ProviderConfig,
    api_key: String,
    endpoint: url::Url,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    // Manual impl so the API key never appears in debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with the given configuration.
    ///
    /// Fails when the API key is missing or the base URL does not parse.
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| missing_api_key_error("anthropic"))?;

        let raw_url = config.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL);
        let endpoint = url::Url::parse(raw_url).map_err(|e| LlmError::Configuration {
            message: format!("invalid base URL '{}': {}", raw_url, e),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(LlmError::Configuration {
                message: format!("unsupported URL scheme '{}'", endpoint.scheme()),
            });
        }

        let client = build_http_client()?;
        Ok(Self {
            config,
            api_key,
            endpoint,
            client,
        })
    }

    /// The endpoint requests are posted to
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Build the request body for the API
    fn build_request_body(
        &self,
        messages: &[Message],
        system: Option<&str>,
        tools: &[ToolDefinition],
        request_options: &LlmRequestOptions,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": request_options
                .temperature_override
                .unwrap_or(self.config.temperature),
        });

        if let Some(sys) = system {
            body["system"] = serde_json::json!(sys);
        }

        let claude_messages: Vec<serde_json::Value> =
            messages.iter().map(|m| self.message_to_claude(m)).collect();
        body["messages"] = serde_json::json!(claude_messages);

        // tool_choice is only valid alongside tools.
        if !tools.is_empty() {
            let claude_tools: Vec<serde_json::Value> =
                tools.iter().map(|t| self.tool_to_claude(t)).collect();
            body["tools"] = serde_json::json!(claude_tools);
            match request_options.tool_choice {
                ToolChoice::Auto => body["tool_choice"] = serde_json::json!({ "type": "auto" }),
                ToolChoice::None => {}
            }
        }

        body
    }

    /// Convert a Message to Claude API format
    fn message_to_claude(&self, message: &Message) -> serde_json::Value {
        let role = match message.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        let content: Vec<serde_json::Value> = message
            .content
            .iter()
            .map(|c| match c {
                MessageContent::Text { text } => {
                    serde_json::json!({
                        "type": "text",
                        "text": text
                    })
                }
                MessageContent::ToolUse { id, name, input } => {
                    serde_json::json!({
                        "type": "tool_use",
                        "id": id,
                        "name": name,
                        "input": input
                    })
                }
                MessageContent::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => {
                    let mut result = serde_json::json!({
                        "type": "tool_result",
                        "tool_use_id": tool_use_id,
                        "content": content
                    });
                    if let Some(true) = is_error {
                        result["is_error"] = serde_json::json!(true);
                    }
                    result
                }
            })
            .collect();

        serde_json::json!({
            "role": role,
            "content": content
        })
    }

    /// Convert a ToolDefinition to Claude API format
    fn tool_to_claude(&self, tool: &ToolDefinition) -> serde_json::Value {
        serde_json::json!({
            "name": tool.name,
            "description": tool.description,
            "input_schema": tool.input_schema
        })
    }

    /// Parse a response from Claude API
    fn parse_response(&self, response: ClaudeResponse) -> LlmResponse {
        let content = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(MessageContent::Text { text }),
                ContentBlock::ToolUse { id, name, input } => {
                    Some(MessageContent::ToolUse { id, name, input })
                }
                ContentBlock::Unsupported => None,
            })
            .collect();

        let stop_reason = response
            .stop_reason
            .as_deref()
            .map(StopReason::from)
            .unwrap_or(StopReason::EndTurn);

        LlmResponse {
            content,
            stop_reason,
            usage: UsageStats {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
            model: response.model,
        }
    }

    fn retry_policy(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(4),
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_max_elapsed_secs)),
            ..Default::default()
        }
    }

    /// One HTTP exchange, classifying failures for the retry loop
    async fn post_once(
        &self,
        body: &serde_json::Value,
    ) -> Result<ClaudeResponse, BackoffError<LlmError>> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                BackoffError::permanent(LlmError::NetworkError {
                    message: e.to_string(),
                })
            })?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        let body_text = response.text().await.map_err(|e| {
            BackoffError::permanent(LlmError::NetworkError {
                message: e.to_string(),
            })
        })?;

        if status != 200 {
            let mut err = parse_http_error(status, &body_text, "anthropic");
            if let LlmError::RateLimited {
                retry_after: after, ..
            } = &mut err
            {
                *after = retry_after.and_then(retry_after_hint);
            }

            if !err.is_retryable() {
                return Err(BackoffError::permanent(err));
            }
            warn!(status, "anthropic request failed, retrying");
            return Err(match retry_after {
                Some(secs) => BackoffError::retry_after(err, Duration::from_secs(secs)),
                None => BackoffError::transient(err),
            });
        }

        serde_json::from_str(&body_text).map_err(|e| {
            BackoffError::permanent(LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })
        })
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let body = self.build_request_body(&messages, system.as_deref(), &tools, &request_options);
        debug!(
            model = %self.config.model,
            messages = messages.len(),
            tools = tools.len(),
            "sending anthropic request"
        );

        let claude_response = retry(self.retry_policy(), || self.post_once(&body)).await?;
        Ok(self.parse_response(claude_response))
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Seconds from a `retry-after` header; HTTP-date values are ignored.
fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

/// Retry hint carried by `LlmError::RateLimited`; dropped when it does not
/// fit rather than wrapped.
fn retry_after_hint(secs: u64) -> Option<u32> {
    u32::try_from(secs).ok()
}

/// Claude API response format
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
    model: String,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: ResponseUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Thinking, server tool results and anything newer
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}
