//! Anthropic Messages API provider over reqwest.

use async_stream::try_stream;
use athena_common::ProviderId;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

use crate::{
    ChatRequest, ChatResponse, ChunkStream, ModelProvider, ProviderError, ProviderFuture, Role,
    StreamChunk, TokenUsage,
};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

// The Messages API requires max_tokens on every request.
const DEFAULT_MAX_TOKENS: u32 = 2048;

#[derive(Debug, Clone)]
pub struct AnthropicChatProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicChatProvider {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, body: &Value) -> Result<Response, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProviderError::timeout(err.to_string())
                } else {
                    ProviderError::transport(err.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(parse_error(response).await);
        }

        Ok(response)
    }
}

impl ModelProvider for AnthropicChatProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn models(&self) -> Vec<String> {
        [
            "claude-haiku-4-5-20251001",
            "claude-3-opus-20240229",
            "claude-3-sonnet-20240229",
            "claude-3-haiku-20240307",
        ]
        .map(String::from)
        .to_vec()
    }

    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let fallback_model = request.model.clone();
            let body = build_request_body(&request, false);

            let parsed: Value = self
                .send(&body)
                .await?
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            Ok(parse_response(parsed, &fallback_model))
        })
    }

    fn stream<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let body = build_request_body(&request, true);
            let response = self.send(&body).await?;

            let stream = try_stream! {
                let mut bytes = response.bytes_stream();
                let mut sse_buffer = String::new();
                let mut finished = false;

                while let Some(item) = bytes.next().await {
                    let chunk = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    let text = std::str::from_utf8(&chunk)
                        .map_err(|err| ProviderError::transport(err.to_string()))?;
                    sse_buffer.push_str(text);

                    while let Some(newline_index) = sse_buffer.find('\n') {
                        let line = sse_buffer.drain(..=newline_index).collect::<String>();
                        let line = line.trim();

                        // Event-name lines carry no payload of their own.
                        if !line.starts_with("data:") {
                            continue;
                        }

                        let payload = line.trim_start_matches("data:").trim();
                        let event = parse_stream_event(payload)?;
                        let terminal = event.finish_reason.is_some()
                            || event.raw.get("type").and_then(Value::as_str)
                                == Some("message_stop");
                        yield event;

                        if terminal {
                            finished = true;
                            break;
                        }
                    }

                    if finished {
                        break;
                    }
                }
            };

            Ok(Box::pin(stream) as ChunkStream<'a>)
        })
    }
}

fn build_request_body(request: &ChatRequest, stream: bool) -> Value {
    // System prompts ride a dedicated top-level field, not the transcript.
    let system = request
        .messages
        .iter()
        .filter(|message| message.role == Role::System)
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut messages = request
        .messages
        .iter()
        .filter(|message| message.role != Role::System)
        .map(|message| json!(message))
        .collect::<Vec<_>>();
    messages.extend(request.tool_messages.iter().cloned());

    let mut body = json!({
        "model": request.model,
        "messages": messages,
        "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "stream": stream,
    });

    if !system.is_empty() {
        body["system"] = json!(system);
    }

    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }

    if let Some(top_p) = request.top_p {
        body["top_p"] = json!(top_p);
    }

    if !request.tools.is_empty() {
        body["tools"] = Value::Array(request.tools.clone());
    }

    body
}

fn parse_response(body: Value, fallback_model: &str) -> ChatResponse {
    // Text blocks concatenate; tool_use blocks stay in the raw document.
    let content = body
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default();

    let finish_reason = body
        .get("stop_reason")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    let model = body
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or(fallback_model)
        .to_string();

    ChatResponse {
        provider: ProviderId::Anthropic,
        model,
        content,
        finish_reason,
        usage: parse_usage(&body),
        raw: body,
    }
}

fn parse_usage(body: &Value) -> TokenUsage {
    let field = |name: &str| {
        body.get("usage")
            .and_then(|usage| usage.get(name))
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32
    };

    let input_tokens = field("input_tokens");
    let output_tokens = field("output_tokens");

    TokenUsage {
        input_tokens,
        output_tokens,
        total_tokens: input_tokens + output_tokens,
    }
}

fn parse_stream_event(payload: &str) -> Result<StreamChunk, ProviderError> {
    let parsed: Value = serde_json::from_str(payload)
        .map_err(|err| ProviderError::transport(format!("malformed stream payload: {err}")))?;

    let event_type = parsed.get("type").and_then(Value::as_str);

    let delta = if event_type == Some("content_block_delta") {
        parsed
            .get("delta")
            .filter(|delta| delta.get("type").and_then(Value::as_str) == Some("text_delta"))
            .and_then(|delta| delta.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    } else {
        String::new()
    };

    let finish_reason = if event_type == Some("message_delta") {
        parsed
            .get("delta")
            .and_then(|delta| delta.get("stop_reason"))
            .and_then(Value::as_str)
            .map(ToString::to_string)
    } else {
        None
    };

    Ok(StreamChunk {
        delta,
        finish_reason,
        raw: parsed,
    })
}

async fn parse_error(response: Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body)
        .unwrap_or_else(|| format!("Anthropic request failed with status {status}"));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::timeout(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(message)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::TOO_EARLY => {
            ProviderError::unavailable(message)
        }
        _ => ProviderError::transport(message),
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")?
        .get("message")?
        .as_str()
        .map(ToString::to_string)
}
