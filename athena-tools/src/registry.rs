//! Process-wide tool catalog keyed by tool definition name.
//!
//! One registry is constructed at process start and shared explicitly
//! (`Arc<ToolRegistry>`) by every component that needs tool lookup. The
//! interior lock keeps each mutation atomic with respect to concurrent
//! enumeration.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use athena_common::OrderedRegistry;

use crate::{Tool, ToolDefinition, ToolError};

#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<OrderedRegistry<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its definition name. Names are unique: a
    /// second registration for an occupied name fails and leaves the
    /// registry exactly as it was.
    pub fn register<T>(&self, tool: T) -> Result<(), ToolError>
    where
        T: Tool + 'static,
    {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.definition().name;
        self.write()
            .try_insert(name.clone(), tool)
            .map_err(|_| ToolError::duplicate(format!("tool '{name}' is already registered")))
    }

    /// Idempotent removal; absent names are ignored.
    pub fn unregister(&self, name: &str) {
        self.write().remove(name);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn list_names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Snapshot of the catalog. Mutating the returned map does not affect
    /// the registry.
    pub fn all(&self) -> HashMap<String, Arc<dyn Tool>> {
        self.read()
            .iter()
            .map(|(name, tool)| (name.clone(), Arc::clone(tool)))
            .collect()
    }

    /// Definitions for every registered tool, in `list_names()` order.
    pub fn schemas(&self) -> Vec<ToolDefinition> {
        self.read().values().map(|tool| tool.definition()).collect()
    }

    /// Definitions for the named tools only, preserving registration order.
    /// Unknown names are skipped.
    pub fn schemas_for(&self, names: &[String]) -> Vec<ToolDefinition> {
        self.read()
            .iter()
            .filter(|(name, _)| names.contains(name))
            .map(|(_, tool)| tool.definition())
            .collect()
    }

    /// Empties the catalog. Intended for test isolation, not production.
    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, OrderedRegistry<String, Arc<dyn Tool>>> {
        self.tools.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, OrderedRegistry<String, Arc<dyn Tool>>> {
        self.tools.write().unwrap_or_else(PoisonError::into_inner)
    }
}
