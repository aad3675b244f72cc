//! Request and response value types shared by every chat provider.

use athena_common::ProviderId;
use serde::Serialize;
use serde_json::Value;

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// One provider round trip.
///
/// `tools` and `tool_messages` carry wire-shaped JSON produced by the
/// adapter for the target provider; this crate forwards them untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub tools: Vec<Value>,
    pub tool_messages: Vec<Value>,
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            top_p: None,
            tools: Vec::new(),
            tool_messages: Vec::new(),
            stream: false,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_messages(mut self, tool_messages: Vec<Value>) -> Self {
        self.tool_messages = tool_messages;
        self
    }

    pub fn enable_streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(max_tokens) = self.max_tokens {
            if max_tokens == 0 {
                return Err(ProviderError::invalid_request(
                    "max_tokens must be greater than zero",
                ));
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ProviderError::invalid_request(
                    "temperature must be in the inclusive range 0.0..=2.0",
                ));
            }
        }

        if let Some(top_p) = self.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(ProviderError::invalid_request(
                    "top_p must be in the inclusive range 0.0..=1.0",
                ));
            }
        }

        Ok(())
    }
}

/// Completed (non-streaming) provider turn.
///
/// `raw` keeps the provider's own response document so downstream
/// translation layers can read provider-specific structure out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub provider: ProviderId,
    pub model: String,
    pub content: String,
    pub finish_reason: Option<String>,
    pub usage: TokenUsage,
    pub raw: Value,
}

/// One streamed event from a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    pub delta: String,
    pub finish_reason: Option<String>,
    pub raw: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest::new("gpt-4", vec![ChatMessage::user("hi")])
    }

    #[test]
    fn validate_enforces_the_request_contract() {
        let empty_model = ChatRequest::new("   ", vec![ChatMessage::user("hi")]);
        let err = empty_model.validate().expect_err("empty model must fail");
        assert_eq!(err.kind, crate::ProviderErrorKind::InvalidRequest);

        let empty_messages = ChatRequest::new("gpt-4", Vec::new());
        assert!(empty_messages.validate().is_err());

        assert!(request().with_max_tokens(0).validate().is_err());
        assert!(request().with_temperature(2.5).validate().is_err());
        assert!(request().with_top_p(1.5).validate().is_err());
    }

    #[test]
    fn validate_accepts_a_complete_request() {
        let ok = request()
            .with_temperature(0.7)
            .with_max_tokens(256)
            .with_top_p(0.9)
            .enable_streaming();
        assert!(ok.validate().is_ok());
        assert!(ok.stream);
    }

    #[test]
    fn role_names_match_the_wire() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }
}
