use std::collections::BTreeMap;
use std::sync::Arc;

use crate::executor::NodeExecutor;
use crate::http::HttpNodeExecutor;

/// Lookup from a node-type tag to its executor. Built once at process
/// start from the compiled-in set of node kinds and passed by reference
/// into the orchestrator; there is no runtime registration after that.
pub struct ExecutorRegistry {
    executors: BTreeMap<String, Arc<dyn NodeExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self {
            executors: BTreeMap::new(),
        }
    }

    /// Registry with all built-in node types.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("http", Arc::new(HttpNodeExecutor::new()));
        registry
    }

    /// Idempotent insert; the last writer for a given tag wins.
    pub fn register(&mut self, node_type: impl Into<String>, executor: Arc<dyn NodeExecutor>) {
        self.executors.insert(node_type.into(), executor);
    }

    /// A miss is the orchestrator's cue to fail the run with an
    /// "unsupported node type" error.
    pub fn get(&self, node_type: &str) -> Option<Arc<dyn NodeExecutor>> {
        self.executors.get(node_type).cloned()
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
