use async_trait::async_trait;
use serde_json::Value as JsonValue;
use trellis_core::{NodeResult, ValidationError};

use crate::runtime::RunContext;

/// Infrastructure-level executor failure. A node whose external work
/// completed but produced an unacceptable outcome is *not* an error here:
/// that is a logical failure and travels as `NodeResult { success: false }`.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("invalid node config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// The polymorphic contract one node type implements. Executors are looked
/// up through the registry by the node's type tag; `config` is the node's
/// opaque configuration, meaningful only to the matching executor.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    async fn execute(
        &self,
        ctx: &RunContext,
        config: &JsonValue,
    ) -> Result<NodeResult, ExecutionError>;

    fn validate_config(&self, config: &JsonValue) -> Result<(), ValidationError>;
}
