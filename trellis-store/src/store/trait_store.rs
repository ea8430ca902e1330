use async_trait::async_trait;
use chrono::{DateTime, Utc};
use trellis_core::RunStatus;

use crate::store::types::{NewRun, RunFilter, RunRecord};

#[async_trait]
pub trait RunStore: Send + Sync {
    async fn insert_run(&self, run: NewRun) -> Result<RunRecord, StoreError>;

    async fn get_run(&self, id: i64) -> Result<Option<RunRecord>, StoreError>;

    async fn count_runs(&self, filter: &RunFilter) -> Result<i64, StoreError>;

    /// Fetch one page of runs matching `filter`, ordered by submission time
    /// descending.
    async fn list_runs(
        &self,
        filter: &RunFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RunRecord>, StoreError>;

    /// Completion bookkeeping: stamp the completion time and cache the
    /// terminal status. Last writer wins; the definition snapshot is never
    /// touched.
    async fn mark_run_completed(
        &self,
        id: i64,
        completed_date: DateTime<Utc>,
        status: RunStatus,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store error: {0}")]
    Other(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Other(e.to_string())
    }
}
