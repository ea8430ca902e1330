mod local;

pub use local::{ActivityWorker, LocalRuntime};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use trellis_core::{Definition, RunStatus};

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// The runtime reports the run itself failed at the application level.
    #[error("application error: {0}")]
    Application(String),
    /// The runtime could not be reached or the call did not complete.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Retry policy for activity invocations, enforced by the runtime rather
/// than by executors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub backoff_coefficient: f64,
    pub maximum_interval: Duration,
    pub maximum_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            backoff_coefficient: 2.0,
            maximum_interval: Duration::from_secs(60),
            maximum_attempts: 3,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after a failed attempt `attempt_no` (1-based), with
    /// full jitter over the capped exponential.
    pub fn backoff_for(&self, attempt_no: u32) -> Duration {
        let exp = attempt_no.saturating_sub(1) as i32;
        let raw = (self.initial_interval.as_millis() as f64) * self.backoff_coefficient.powi(exp);
        let capped = raw.min(self.maximum_interval.as_millis() as f64).max(0.0) as u64;
        let jittered = if capped == 0 { 0 } else { fastrand::u64(..=capped) };
        Duration::from_millis(jittered)
    }
}

#[derive(Debug, Clone)]
pub struct ActivityOptions {
    pub start_to_close_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ActivityOptions {
    fn default() -> Self {
        Self {
            start_to_close_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ActivityError {
    #[error("invalid activity input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Failed(String),
}

/// One unit of externally visible side-effecting work. Activities are
/// registered with the runtime by name and invoked with at-least-once
/// semantics under the caller's retry policy.
#[async_trait]
pub trait Activity: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, input: JsonValue) -> Result<JsonValue, ActivityError>;
}

/// The runtime's activity-dispatch facility as seen from inside a run.
#[async_trait]
pub trait ActivityDispatcher: Send + Sync {
    async fn execute_activity(
        &self,
        name: &str,
        input: JsonValue,
        options: &ActivityOptions,
    ) -> Result<JsonValue, RuntimeError>;
}

/// The durable-execution substrate at its boundary: submit a run, and ask
/// it later what the current status of that run is. Retry, timeout, and
/// status tracking live behind this trait.
#[async_trait]
pub trait DurableRuntime: Send + Sync {
    /// Start a run under the given id; returns the external execution id.
    async fn start(&self, run_id: &str, definition: Definition) -> Result<String, RuntimeError>;

    /// Status oracle for a previously started run.
    async fn describe(&self, execution_id: &str) -> Result<RunStatus, RuntimeError>;
}

/// Per-run handle passed to executors. Suspension points within a run all
/// go through `execute_activity`.
#[derive(Clone)]
pub struct RunContext {
    run_id: String,
    dispatcher: Arc<dyn ActivityDispatcher>,
}

impl RunContext {
    pub fn new(run_id: impl Into<String>, dispatcher: Arc<dyn ActivityDispatcher>) -> Self {
        Self {
            run_id: run_id.into(),
            dispatcher,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub async fn execute_activity(
        &self,
        name: &str,
        input: JsonValue,
        options: &ActivityOptions,
    ) -> Result<JsonValue, RuntimeError> {
        self.dispatcher.execute_activity(name, input, options).await
    }
}
