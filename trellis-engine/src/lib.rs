#![forbid(unsafe_code)]

pub mod events;
pub mod executor;
pub mod http;
pub mod orchestrator;
pub mod registry;
pub mod runtime;
pub mod service;

pub use events::{EventSink, NoopEventSink, RunEvent, WebhookEventSink};
pub use executor::{ExecutionError, NodeExecutor};
pub use http::{HttpClient, HttpError, HttpNodeExecutor, ReqwestHttpClient};
pub use orchestrator::{Orchestrator, RunError};
pub use registry::ExecutorRegistry;
pub use runtime::{
    Activity, ActivityDispatcher, ActivityError, ActivityOptions, ActivityWorker, DurableRuntime,
    LocalRuntime, RetryPolicy, RunContext, RuntimeError,
};
pub use service::{ListPage, ListParams, Run, RunService, ServiceError};
