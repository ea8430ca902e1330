use std::collections::BTreeSet;
use std::sync::Arc;

use trellis_core::{Definition, DefinitionError, Node};

use crate::executor::ExecutionError;
use crate::registry::ExecutorRegistry;
use crate::runtime::RunContext;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error("unsupported node type: {0}")]
    UnsupportedNodeType(String),
    #[error("failed to execute node {node_id}: {source}")]
    Execution {
        node_id: String,
        #[source]
        source: ExecutionError,
    },
    #[error("node {node_id} failed: {message}")]
    NodeFailed { node_id: String, message: String },
}

/// Walks a definition and invokes the registered executor per node.
///
/// Traversal is deliberately shallow: entry nodes run in order, then each
/// entry node's immediate `next` nodes; edges beyond that first hop are not
/// followed. Node references are resolved lazily, so a dangling id aborts
/// the run at the point it is reached; nodes executed before it keep
/// their side effects. The first failing node aborts the whole run; there
/// is no compensation of completed nodes.
pub struct Orchestrator {
    registry: Arc<ExecutorRegistry>,
}

impl Orchestrator {
    pub fn new(registry: Arc<ExecutorRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, ctx: &RunContext, def: &Definition) -> Result<(), RunError> {
        tracing::info!(
            run_id = %ctx.run_id(),
            name = %def.name,
            version = %def.version,
            "starting run"
        );

        let mut visited: BTreeSet<String> = BTreeSet::new();

        for entry_id in &def.entry_points {
            let node = def
                .nodes
                .get(entry_id)
                .ok_or_else(|| DefinitionError::EntryPointNotFound(entry_id.clone()))?;

            self.execute_node(ctx, node, &mut visited).await?;

            for next_id in &node.next {
                let next = def
                    .nodes
                    .get(next_id)
                    .ok_or_else(|| DefinitionError::NextNotFound(next_id.clone()))?;

                self.execute_node(ctx, next, &mut visited).await?;
            }
        }

        Ok(())
    }

    async fn execute_node(
        &self,
        ctx: &RunContext,
        node: &Node,
        visited: &mut BTreeSet<String>,
    ) -> Result<(), RunError> {
        // Visited guard: a node id reached twice (cycle or duplicate edge)
        // fails the run instead of re-executing.
        if !visited.insert(node.id.clone()) {
            return Err(DefinitionError::AlreadyExecuted(node.id.clone()).into());
        }

        tracing::info!(run_id = %ctx.run_id(), id = %node.id, r#type = %node.node_type, "executing node");

        let executor = self
            .registry
            .get(&node.node_type)
            .ok_or_else(|| RunError::UnsupportedNodeType(node.node_type.clone()))?;

        let result = executor
            .execute(ctx, &node.config)
            .await
            .map_err(|e| RunError::Execution {
                node_id: node.id.clone(),
                source: e,
            })?;

        if !result.success {
            return Err(RunError::NodeFailed {
                node_id: node.id.clone(),
                message: result.error.unwrap_or_default(),
            });
        }

        Ok(())
    }
}
