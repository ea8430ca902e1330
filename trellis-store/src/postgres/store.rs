use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trellis_core::RunStatus;

use crate::store::{Domain, NewRun, RunFilter, RunRecord, RunStore, StoreError};

use super::runs;

pub struct PostgresRunStore {
    pool: PgPool,
    domain: Domain,
}

impl PostgresRunStore {
    pub fn new(pool: PgPool, domain: Domain) -> Self {
        Self { pool, domain }
    }

    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        domain: Domain,
    ) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool, domain })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }
}

#[async_trait::async_trait]
impl RunStore for PostgresRunStore {
    async fn insert_run(&self, run: NewRun) -> Result<RunRecord, StoreError> {
        runs::insert_run(&self.pool, self.domain, run).await
    }

    async fn get_run(&self, id: i64) -> Result<Option<RunRecord>, StoreError> {
        runs::get_run(&self.pool, self.domain, id).await
    }

    async fn count_runs(&self, filter: &RunFilter) -> Result<i64, StoreError> {
        runs::count_runs(&self.pool, self.domain, filter).await
    }

    async fn list_runs(
        &self,
        filter: &RunFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RunRecord>, StoreError> {
        runs::list_runs(&self.pool, self.domain, filter, limit, offset).await
    }

    async fn mark_run_completed(
        &self,
        id: i64,
        completed_date: DateTime<Utc>,
        status: RunStatus,
    ) -> Result<(), StoreError> {
        runs::mark_run_completed(&self.pool, self.domain, id, completed_date, status).await
    }
}
