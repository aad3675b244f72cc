//! Metrics-based observability hooks for the tool runtime.
//!
//! ```rust
//! use athena_observe::MetricsObservabilityHooks;
//! use athena_tools::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use athena_tools::{
    StandardToolCall, ToolContext, ToolError, ToolExecutionResult, ToolRuntimeHooks,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_call: &StandardToolCall, _context: &ToolContext) {
        metrics::counter!(
            "athena_tool_execution_start_total",
            "tool_name" => tool_call.tool_name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        tool_call: &StandardToolCall,
        _context: &ToolContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "athena_tool_execution_success_total",
            "tool_name" => tool_call.tool_name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "athena_tool_execution_duration_seconds",
            "tool_name" => tool_call.tool_name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_call: &StandardToolCall,
        _context: &ToolContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "athena_tool_execution_failure_total",
            "tool_name" => tool_call.tool_name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "athena_tool_execution_duration_seconds",
            "tool_name" => tool_call.tool_name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
