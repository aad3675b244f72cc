//! Tool trait contract for registry-managed capabilities.
//!
//! ```rust
//! use athena_tools::{FunctionTool, Tool, ToolDefinition, ToolExecutionResult};
//! use serde_json::json;
//!
//! let tool = FunctionTool::new(
//!     ToolDefinition::new("echo", "Echoes input", json!({"type": "object"})),
//!     |params, _ctx| async move { Ok(ToolExecutionResult::ok("echo", params)) },
//! );
//!
//! assert_eq!(tool.definition().name, "echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use athena_common::BoxFuture;
use serde_json::Value;

use crate::{ToolContext, ToolDefinition, ToolError, ToolExecutionResult};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Runs the tool. Expected failure modes (missing credential, not-found
    /// resource, invalid argument) come back as `success=false` results;
    /// only unexpected failures surface as `Err`, and the runtime converts
    /// those to failure results before they cross the adapter boundary.
    fn execute<'a>(
        &'a self,
        parameters: Value,
        context: &'a ToolContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;

    /// Shallow pre-check, not full schema validation: verifies only that
    /// every name in the schema's `required` list is present as a key.
    /// Types, enums, and ranges are not checked. Implementers may override
    /// with a full validator.
    fn validate_parameters(&self, parameters: &Value) -> bool {
        let definition = self.definition();
        let required = definition.required_parameters();
        if required.is_empty() {
            return true;
        }

        let Some(object) = parameters.as_object() else {
            return false;
        };

        required.iter().all(|name| object.contains_key(*name))
    }
}

type ToolHandler = dyn Fn(Value, ToolContext) -> ToolFuture<'static, Result<ToolExecutionResult, ToolError>>
    + Send
    + Sync;

/// Closure-backed tool for lightweight capabilities and tests.
pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(Value, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolExecutionResult, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> =
            Arc::new(move |parameters, context| Box::pin(handler(parameters, context)));

        Self {
            definition,
            handler,
        }
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn execute<'a>(
        &'a self,
        parameters: Value,
        context: &'a ToolContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        let context = context.clone();
        (self.handler)(parameters, context)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn lookup_tool() -> FunctionTool {
        FunctionTool::new(
            ToolDefinition::new(
                "lookup",
                "Looks up a record",
                json!({
                    "type": "object",
                    "properties": {
                        "id": {"type": "string"},
                        "verbose": {"type": "boolean"},
                    },
                    "required": ["id"],
                }),
            ),
            |params, _ctx| async move { Ok(ToolExecutionResult::ok("lookup", params)) },
        )
    }

    #[test]
    fn validate_parameters_checks_only_required_presence() {
        let tool = lookup_tool();

        assert!(tool.validate_parameters(&json!({"id": "r1"})));
        // Extra, schema-undeclared keys pass the shallow check.
        assert!(tool.validate_parameters(&json!({"id": "r1", "unknown": 7})));
        // Wrong type for a required key still passes; depth is out of scope.
        assert!(tool.validate_parameters(&json!({"id": 42})));
        assert!(!tool.validate_parameters(&json!({"verbose": true})));
        assert!(!tool.validate_parameters(&json!("not an object")));
    }

    #[test]
    fn validate_parameters_accepts_anything_without_required_list() {
        let tool = FunctionTool::new(
            ToolDefinition::new("echo", "Echo", json!({"type": "object"})),
            |params, _ctx| async move { Ok(ToolExecutionResult::ok("echo", params)) },
        );

        assert!(tool.validate_parameters(&json!({})));
        assert!(tool.validate_parameters(&json!(null)));
    }

    #[tokio::test]
    async fn function_tool_invokes_its_handler() {
        let tool = lookup_tool();
        let result = tool
            .execute(json!({"id": "r1"}), &ToolContext::new())
            .await
            .expect("execution should succeed");

        assert!(result.success);
        assert_eq!(result.result, Some(json!({"id": "r1"})));
    }
}
