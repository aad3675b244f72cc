//! Vendor-neutral tool data model shared by the registry, runtime, and adapters.

use athena_common::MetadataMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::ToolError;

/// Model-facing identity and parameter contract of a tool.
///
/// `parameters_schema` is a JSON-Schema-shaped object (`type`, `properties`,
/// `required`) and must be stable across calls for the same tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters_schema: Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters_schema,
        }
    }

    /// Property names the schema marks as required.
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// A tool invocation decoded from a provider response.
///
/// `id` is the provider-assigned correlation token; providers without
/// explicit ids leave it absent.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardToolCall {
    pub id: Option<String>,
    pub tool_name: String,
    pub parameters: Value,
}

impl StandardToolCall {
    pub fn new(id: Option<String>, tool_name: impl Into<String>, parameters: Value) -> Self {
        Self {
            id,
            tool_name: tool_name.into(),
            parameters,
        }
    }
}

/// Structured outcome of one tool execution.
///
/// `result` is present iff `success`; `error` iff not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolExecutionResult {
    pub tool_name: String,
    pub success: bool,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl ToolExecutionResult {
    pub fn ok(tool_name: impl Into<String>, result: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn fail(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    /// The value adapters JSON-encode into provider-bound result content.
    ///
    /// Successful executions carry the bare result object; failures carry a
    /// structured failure object so the model can react to them.
    pub fn content_payload(&self) -> Value {
        if self.success {
            self.result
                .clone()
                .unwrap_or_else(|| Value::Object(Map::new()))
        } else {
            json!({
                "success": false,
                "error": self.error.clone().unwrap_or_default(),
            })
        }
    }
}

/// An execution outcome re-associated with its originating call id, ready
/// for adapter result encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedToolCall {
    pub tool_call_id: Option<String>,
    pub result: ToolExecutionResult,
}

impl CompletedToolCall {
    pub fn new(tool_call_id: Option<String>, result: ToolExecutionResult) -> Self {
        Self {
            tool_call_id,
            result,
        }
    }

    pub fn from_call(call: &StandardToolCall, result: ToolExecutionResult) -> Self {
        Self::new(call.id.clone(), result)
    }
}

/// Out-of-band credentials and identity handed to tool executions.
///
/// Every field is optional; tools requiring an entry fail gracefully with a
/// structured result when it is absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolContext {
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub metadata: MetadataMap,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn require_access_token(&self) -> Result<&str, ToolError> {
        self.access_token
            .as_deref()
            .ok_or_else(|| ToolError::missing_context("no access token in tool context"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_parameters_reads_the_schema() {
        let definition = ToolDefinition::new(
            "google_calendar",
            "Calendar operations",
            json!({
                "type": "object",
                "properties": {"action": {"type": "string"}},
                "required": ["action"],
            }),
        );

        assert_eq!(definition.required_parameters(), vec!["action"]);
    }

    #[test]
    fn required_parameters_is_empty_without_a_required_list() {
        let definition = ToolDefinition::new("echo", "Echo", json!({"type": "object"}));
        assert!(definition.required_parameters().is_empty());
    }

    #[test]
    fn success_payload_is_the_bare_result_object() {
        let result = ToolExecutionResult::ok("echo", json!({"ok": true}));
        assert_eq!(result.content_payload(), json!({"ok": true}));

        let empty = ToolExecutionResult {
            tool_name: "echo".to_string(),
            success: true,
            result: None,
            error: None,
        };
        assert_eq!(empty.content_payload(), json!({}));
    }

    #[test]
    fn failure_payload_carries_the_error() {
        let result = ToolExecutionResult::fail("echo", "token expired");
        assert_eq!(
            result.content_payload(),
            json!({"success": false, "error": "token expired"})
        );
    }

    #[test]
    fn context_requires_access_token_when_asked() {
        let context = ToolContext::new().with_user_id("user-1");
        let error = context
            .require_access_token()
            .expect_err("token should be missing");
        assert_eq!(error.kind, crate::ToolErrorKind::MissingContext);

        let context = context.with_access_token("ya29.token");
        assert_eq!(context.require_access_token(), Ok("ya29.token"));
    }
}
