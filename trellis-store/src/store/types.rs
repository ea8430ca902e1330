use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

/// The two config domains sharing the engine. Each domain owns its own run
/// table; everything else (executors, runtime, service logic) is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Pipeline,
    Policy,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Pipeline => "pipeline",
            Domain::Policy => "policy",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Domain::Pipeline => "pipeline_runs",
            Domain::Policy => "policy_runs",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewRun {
    pub workflow_id: String,
    pub status: String,
    pub submitted_date: DateTime<Utc>,
    pub definition: JsonValue,
}

/// One persisted run of a definition. `definition` is the immutable
/// snapshot taken at submission; `status` is an advisory cache, and the
/// authoritative status comes from the runtime's oracle at read time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunRecord {
    pub id: i64,
    pub workflow_id: String,
    pub status: String,
    pub submitted_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
    pub definition: JsonValue,
}

/// Storage-level filters for listing runs. The status filter is absent on
/// purpose: status is not stored authoritatively, so it cannot be pushed
/// down to the database and is applied after reconciliation instead.
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    /// Case-insensitive substring match over the workflow id and the
    /// definition's declared name.
    pub search: Option<String>,
    pub submitted_after: Option<DateTime<Utc>>,
    pub submitted_before: Option<DateTime<Utc>>,
    pub completed_after: Option<DateTime<Utc>>,
    pub completed_before: Option<DateTime<Utc>>,
}
