//! Capability layer for registering and executing model-invocable tools.

mod error;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        CompletedToolCall, DefaultToolRuntime, FunctionTool, NoopToolRuntimeHooks,
        StandardToolCall, Tool, ToolContext, ToolDefinition, ToolError, ToolErrorKind,
        ToolExecutionResult, ToolFuture, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
    };
}

pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use tool::{FunctionTool, Tool, ToolFuture};
pub use types::{
    CompletedToolCall, StandardToolCall, ToolContext, ToolDefinition, ToolExecutionResult,
};
