use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use trellis_core::{Definition, RunStatus};

use crate::orchestrator::Orchestrator;
use crate::runtime::{
    Activity, ActivityDispatcher, ActivityOptions, DurableRuntime, RunContext, RuntimeError,
};

/// Executes registered activities with at-least-once semantics: each
/// invocation is retried under the caller's policy until it succeeds or
/// attempts are exhausted.
pub struct ActivityWorker {
    activities: BTreeMap<String, Arc<dyn Activity>>,
}

impl ActivityWorker {
    pub fn new() -> Self {
        Self {
            activities: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, activity: Arc<dyn Activity>) {
        self.activities.insert(activity.name().to_string(), activity);
    }
}

impl Default for ActivityWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityDispatcher for ActivityWorker {
    async fn execute_activity(
        &self,
        name: &str,
        input: JsonValue,
        options: &ActivityOptions,
    ) -> Result<JsonValue, RuntimeError> {
        let activity = self
            .activities
            .get(name)
            .ok_or_else(|| RuntimeError::NotFound(format!("activity not registered: {name}")))?;

        let mut attempt: u32 = 1;
        loop {
            let outcome = tokio::time::timeout(
                options.start_to_close_timeout,
                activity.execute(input.clone()),
            )
            .await;

            let last_error = match outcome {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => e.to_string(),
                Err(_) => "start-to-close timeout exceeded".to_string(),
            };

            if attempt >= options.retry.maximum_attempts {
                return Err(RuntimeError::Transport(format!(
                    "activity {name} failed after {attempt} attempts: {last_error}"
                )));
            }

            tracing::debug!(activity = name, attempt, error = %last_error, "activity attempt failed, retrying");
            tokio::time::sleep(options.retry.backoff_for(attempt)).await;
            attempt += 1;
        }
    }
}

/// In-process durable runtime: spawns the orchestrator as a task per run
/// and keeps the status table it answers `describe` from. Stands in for an
/// external durable-execution substrate behind the same trait.
pub struct LocalRuntime {
    orchestrator: Arc<Orchestrator>,
    worker: Arc<ActivityWorker>,
    statuses: Arc<RwLock<HashMap<String, RunStatus>>>,
}

impl LocalRuntime {
    pub fn new(orchestrator: Arc<Orchestrator>, worker: Arc<ActivityWorker>) -> Self {
        Self {
            orchestrator,
            worker,
            statuses: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl DurableRuntime for LocalRuntime {
    async fn start(&self, run_id: &str, definition: Definition) -> Result<String, RuntimeError> {
        let execution_id = run_id.to_string();
        self.statuses
            .write()
            .await
            .insert(execution_id.clone(), RunStatus::Running);

        let ctx = RunContext::new(execution_id.clone(), self.worker.clone());
        let orchestrator = self.orchestrator.clone();
        let statuses = self.statuses.clone();
        let id = execution_id.clone();

        tokio::spawn(async move {
            let status = match orchestrator.execute(&ctx, &definition).await {
                Ok(()) => RunStatus::Completed,
                Err(e) => {
                    tracing::warn!(run_id = %id, error = %e, "run failed");
                    RunStatus::Failed
                }
            };
            statuses.write().await.insert(id, status);
        });

        Ok(execution_id)
    }

    async fn describe(&self, execution_id: &str) -> Result<RunStatus, RuntimeError> {
        self.statuses
            .read()
            .await
            .get(execution_id)
            .copied()
            .ok_or_else(|| RuntimeError::NotFound(format!("unknown execution: {execution_id}")))
    }
}
