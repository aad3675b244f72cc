//! Production-friendly observability hooks for the tool runtime.
//!
//! ```rust
//! use athena_observe::{MetricsObservabilityHooks, SafeToolHooks, TracingObservabilityHooks};
//!
//! let _tool_hooks = SafeToolHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::SafeToolHooks;
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{MetricsObservabilityHooks, SafeToolHooks, TracingObservabilityHooks};
}
