//! Tool runtime trait and default registry-backed executor.

use std::sync::Arc;
use std::time::Instant;

use crate::{
    CompletedToolCall, NoopToolRuntimeHooks, StandardToolCall, ToolContext, ToolError,
    ToolExecutionResult, ToolFuture, ToolRegistry, ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    /// Dispatches one resolved tool call. Infallible at the signature:
    /// unknown tools, failed pre-checks, and tool faults all come back as
    /// `success=false` results carrying the originating call id.
    fn execute<'a>(
        &'a self,
        tool_call: StandardToolCall,
        context: ToolContext,
    ) -> ToolFuture<'a, CompletedToolCall>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        tool_call: StandardToolCall,
        context: ToolContext,
    ) -> ToolFuture<'a, CompletedToolCall> {
        Box::pin(async move {
            self.hooks.on_execution_start(&tool_call, &context);
            let started = Instant::now();

            let Some(tool) = self.registry.get(&tool_call.tool_name) else {
                let error = ToolError::not_found(format!(
                    "tool '{}' is not registered",
                    tool_call.tool_name
                ))
                .with_tool_name(tool_call.tool_name.clone());
                self.hooks
                    .on_execution_failure(&tool_call, &context, &error, started.elapsed());
                return failure(&tool_call, error.message);
            };

            if !tool.validate_parameters(&tool_call.parameters) {
                let error = ToolError::invalid_arguments(format!(
                    "parameters for '{}' are missing required fields",
                    tool_call.tool_name
                ))
                .with_tool_name(tool_call.tool_name.clone());
                self.hooks
                    .on_execution_failure(&tool_call, &context, &error, started.elapsed());
                return failure(&tool_call, error.message);
            }

            match tool.execute(tool_call.parameters.clone(), &context).await {
                Ok(result) if result.success => {
                    self.hooks.on_execution_success(
                        &tool_call,
                        &context,
                        &result,
                        started.elapsed(),
                    );
                    CompletedToolCall::from_call(&tool_call, result)
                }
                Ok(result) => {
                    let error = ToolError::execution(result.error.clone().unwrap_or_default())
                        .with_tool_name(tool_call.tool_name.clone());
                    self.hooks
                        .on_execution_failure(&tool_call, &context, &error, started.elapsed());
                    CompletedToolCall::from_call(&tool_call, result)
                }
                Err(error) => {
                    let error = error.with_tool_name(tool_call.tool_name.clone());
                    self.hooks
                        .on_execution_failure(&tool_call, &context, &error, started.elapsed());
                    failure(&tool_call, error.message)
                }
            }
        })
    }
}

fn failure(tool_call: &StandardToolCall, message: String) -> CompletedToolCall {
    CompletedToolCall::from_call(
        tool_call,
        ToolExecutionResult::fail(tool_call.tool_name.clone(), message),
    )
}
