use std::sync::Arc;

use chrono::{DateTime, Utc};
use trellis_core::{Definition, RunStatus};
use trellis_store::{Domain, NewRun, RunFilter, RunRecord, RunStore, StoreError};

use crate::events::{EventSink, RunEvent};
use crate::runtime::{DurableRuntime, RuntimeError};

/// A run record as exposed to callers: the persisted row combined with the
/// live status obtained from the runtime's oracle.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Run {
    pub id: i64,
    #[serde(rename = "workflowId")]
    pub workflow_id: String,
    pub status: String,
    #[serde(rename = "submittedDate")]
    pub submitted_date: DateTime<Utc>,
    #[serde(rename = "completedDate", skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    pub definition: Definition,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default, rename = "pageSize")]
    pub page_size: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, rename = "submittedAfter")]
    pub submitted_after: Option<DateTime<Utc>>,
    #[serde(default, rename = "submittedBefore")]
    pub submitted_before: Option<DateTime<Utc>>,
    #[serde(default, rename = "completedAfter")]
    pub completed_after: Option<DateTime<Utc>>,
    #[serde(default, rename = "completedBefore")]
    pub completed_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ListPage {
    pub items: Vec<Run>,
    #[serde(rename = "totalItems")]
    pub total_items: i64,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("page must be greater than 0")]
    InvalidPage,
    #[error("pageSize must be greater than 0")]
    InvalidPageSize,
    #[error("page {page} exceeds total pages {total_pages}")]
    PageOutOfRange { page: i64, total_pages: i64 },
    #[error("run {0} not found")]
    NotFound(i64),
    #[error("failed to start run: {0}")]
    StartRun(RuntimeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode definition snapshot: {0}")]
    EncodeSnapshot(serde_json::Error),
    #[error("failed to decode definition snapshot: {0}")]
    DecodeSnapshot(serde_json::Error),
}

/// Per-domain run service: records submissions and answers "what is the
/// status of run X" and "list runs matching filters, paginated" by
/// reconciling stored rows against the runtime's live status.
pub struct RunService {
    domain: Domain,
    store: Arc<dyn RunStore>,
    runtime: Arc<dyn DurableRuntime>,
    events: Arc<dyn EventSink>,
}

impl RunService {
    pub fn new(
        domain: Domain,
        store: Arc<dyn RunStore>,
        runtime: Arc<dyn DurableRuntime>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            domain,
            store,
            runtime,
            events,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Start a run and record it. The stored definition is an immutable
    /// snapshot; status is fetched once eagerly so the caller does not see
    /// a stale placeholder.
    pub async fn submit(&self, definition: Definition) -> Result<Run, ServiceError> {
        let workflow_id = format!(
            "{}_{}_{}_{}",
            self.domain.as_str(),
            definition.name,
            definition.version,
            Utc::now().format("%Y%m%d%H%M%S"),
        );

        let snapshot = serde_json::to_value(&definition).map_err(ServiceError::EncodeSnapshot)?;

        let execution_id = self
            .runtime
            .start(&workflow_id, definition.clone())
            .await
            .map_err(ServiceError::StartRun)?;

        let record = self
            .store
            .insert_run(NewRun {
                workflow_id: execution_id,
                status: RunStatus::Running.to_string(),
                submitted_date: Utc::now(),
                definition: snapshot,
            })
            .await?;

        let status = self.resolve_status(&record.workflow_id).await;

        self.events
            .broadcast(&RunEvent::Submitted {
                domain: self.domain.as_str().to_string(),
                run_id: record.id,
                workflow_id: record.workflow_id.clone(),
            })
            .await;

        Ok(Run {
            id: record.id,
            workflow_id: record.workflow_id,
            status: status.to_string(),
            submitted_date: record.submitted_date,
            completed_date: record.completed_date,
            definition,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Run, ServiceError> {
        let record = self
            .store
            .get_run(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;
        self.reconcile(record).await
    }

    pub async fn list(&self, params: &ListParams) -> Result<ListPage, ServiceError> {
        if params.page < 1 {
            return Err(ServiceError::InvalidPage);
        }
        if params.page_size < 1 {
            return Err(ServiceError::InvalidPageSize);
        }

        let filter = RunFilter {
            search: params.search.clone().filter(|s| !s.is_empty()),
            submitted_after: params.submitted_after,
            submitted_before: params.submitted_before,
            completed_after: params.completed_after,
            completed_before: params.completed_before,
        };

        // The status filter is excluded from the stored count: status is
        // not stored authoritatively and cannot be pushed to the database.
        let mut total_items = self.store.count_runs(&filter).await?;
        let mut total_pages = pages_for(total_items, params.page_size);
        if params.page > total_pages {
            return Err(ServiceError::PageOutOfRange {
                page: params.page,
                total_pages,
            });
        }

        let offset = (params.page - 1) * params.page_size;
        let records = self
            .store
            .list_runs(&filter, params.page_size, offset)
            .await?;

        let status_filter = params.status.as_deref().filter(|s| !s.is_empty());
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            let run = self.reconcile(record).await?;
            if status_filter.map_or(true, |want| run.status == want) {
                items.push(run);
            }
        }

        // With a status filter the totals are recomputed from the surviving
        // rows of this page only; rows on other pages are never consulted.
        if status_filter.is_some() {
            total_items = items.len() as i64;
            total_pages = pages_for(total_items, params.page_size);
        }

        Ok(ListPage {
            items,
            total_items,
            current_page: params.page,
            total_pages,
        })
    }

    /// Combine a stored row with a live status query. Terminal statuses
    /// stamp the completion time on first observation (last writer wins).
    async fn reconcile(&self, mut record: RunRecord) -> Result<Run, ServiceError> {
        let status = self.resolve_status(&record.workflow_id).await;

        if status.is_terminal() && record.completed_date.is_none() {
            let now = Utc::now();
            match self.store.mark_run_completed(record.id, now, status).await {
                Ok(()) => {
                    record.completed_date = Some(now);
                    self.events
                        .broadcast(&RunEvent::Completed {
                            domain: self.domain.as_str().to_string(),
                            run_id: record.id,
                            workflow_id: record.workflow_id.clone(),
                            status: status.to_string(),
                        })
                        .await;
                }
                Err(e) => {
                    tracing::warn!(run_id = record.id, error = %e, "failed to stamp completion");
                }
            }
        }

        let definition: Definition =
            serde_json::from_value(record.definition).map_err(ServiceError::DecodeSnapshot)?;

        Ok(Run {
            id: record.id,
            workflow_id: record.workflow_id,
            status: status.to_string(),
            submitted_date: record.submitted_date,
            completed_date: record.completed_date,
            definition,
        })
    }

    /// Ask the runtime for the live status. Lookup failures degrade to an
    /// optimistic RUNNING guess; an identifiable application-level failure
    /// maps to FAILED.
    async fn resolve_status(&self, execution_id: &str) -> RunStatus {
        match self.runtime.describe(execution_id).await {
            Ok(status) => status,
            Err(RuntimeError::Application(e)) => {
                tracing::debug!(workflow_id = execution_id, error = %e, "runtime reports application failure");
                RunStatus::Failed
            }
            Err(e) => {
                tracing::debug!(workflow_id = execution_id, error = %e, "status lookup failed, assuming still running");
                RunStatus::Running
            }
        }
    }
}

fn pages_for(total_items: i64, page_size: i64) -> i64 {
    let pages = (total_items + page_size - 1) / page_size;
    pages.max(1)
}
