//! OpenAI chat-completions provider over reqwest.

use async_stream::try_stream;
use athena_common::ProviderId;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

use crate::{
    ChatRequest, ChatResponse, ChunkStream, ModelProvider, ProviderError, ProviderFuture,
    StreamChunk, TokenUsage,
};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiChatProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiChatProvider {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, body: &Value) -> Result<Response, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
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

impl ModelProvider for OpenAiChatProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn models(&self) -> Vec<String> {
        [
            "gpt-5-nano-2025-08-07",
            "gpt-4-turbo-preview",
            "gpt-4",
            "gpt-3.5-turbo",
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

                        if !line.starts_with("data:") {
                            continue;
                        }

                        let payload = line.trim_start_matches("data:").trim();
                        if payload == "[DONE]" {
                            finished = true;
                            break;
                        }

                        yield parse_stream_payload(payload)?;
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
    let mut messages = request
        .messages
        .iter()
        .map(|message| json!(message))
        .collect::<Vec<_>>();
    messages.extend(request.tool_messages.iter().cloned());

    let mut body = json!({
        "model": request.model,
        "messages": messages,
        "stream": stream,
    });

    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }

    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = json!(max_tokens);
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
    let message = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"));

    let content = message
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let finish_reason = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("finish_reason"))
        .and_then(Value::as_str)
        .map(ToString::to_string);

    let model = body
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or(fallback_model)
        .to_string();

    ChatResponse {
        provider: ProviderId::OpenAi,
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

    TokenUsage {
        input_tokens: field("prompt_tokens"),
        output_tokens: field("completion_tokens"),
        total_tokens: field("total_tokens"),
    }
}

fn parse_stream_payload(payload: &str) -> Result<StreamChunk, ProviderError> {
    let parsed: Value = serde_json::from_str(payload)
        .map_err(|err| ProviderError::transport(format!("malformed stream payload: {err}")))?;

    let choice = parsed
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first());

    let delta = choice
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let finish_reason = choice
        .and_then(|choice| choice.get("finish_reason"))
        .and_then(Value::as_str)
        .map(ToString::to_string);

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
        .unwrap_or_else(|| format!("OpenAI request failed with status {status}"));

    map_status(status, message)
}

fn map_status(status: StatusCode, message: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::timeout(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(message)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
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
