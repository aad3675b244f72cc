//! Tracing-based observability hooks for the tool runtime.
//!
//! ```rust
//! use athena_observe::TracingObservabilityHooks;
//! use athena_tools::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use athena_tools::{
    StandardToolCall, ToolContext, ToolError, ToolExecutionResult, ToolRuntimeHooks,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &StandardToolCall, context: &ToolContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_call.tool_name,
            tool_call_id = tool_call.id.as_deref(),
            user_id = context.user_id.as_deref()
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &StandardToolCall,
        context: &ToolContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = tool_call.tool_name,
            tool_call_id = tool_call.id.as_deref(),
            user_id = context.user_id.as_deref(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &StandardToolCall,
        context: &ToolContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "tool",
            event = "execution_failure",
            tool_name = tool_call.tool_name,
            tool_call_id = tool_call.id.as_deref(),
            user_id = context.user_id.as_deref(),
            error_kind = ?error.kind,
            error = %error,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }
}
