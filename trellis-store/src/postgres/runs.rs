use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use trellis_core::RunStatus;

use crate::store::{Domain, NewRun, RunFilter, RunRecord, StoreError};

const RUN_COLUMNS: &str = "id, workflow_id, status, submitted_date, completed_date, definition";

pub async fn insert_run(
    pool: &PgPool,
    domain: Domain,
    run: NewRun,
) -> Result<RunRecord, StoreError> {
    let sql = format!(
        "INSERT INTO {table} (workflow_id, status, submitted_date, definition)
         VALUES ($1, $2, $3, $4)
         RETURNING {RUN_COLUMNS}",
        table = domain.table(),
    );

    let record = sqlx::query_as::<_, RunRecord>(&sql)
        .bind(&run.workflow_id)
        .bind(&run.status)
        .bind(run.submitted_date)
        .bind(&run.definition)
        .fetch_one(pool)
        .await?;

    Ok(record)
}

pub async fn get_run(
    pool: &PgPool,
    domain: Domain,
    id: i64,
) -> Result<Option<RunRecord>, StoreError> {
    let sql = format!(
        "SELECT {RUN_COLUMNS} FROM {table} WHERE id = $1",
        table = domain.table(),
    );

    let record = sqlx::query_as::<_, RunRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(record)
}

pub async fn count_runs(
    pool: &PgPool,
    domain: Domain,
    filter: &RunFilter,
) -> Result<i64, StoreError> {
    let mut qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new(format!("SELECT COUNT(*) FROM {} WHERE 1=1", domain.table()));
    push_filter(&mut qb, filter);

    let count: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(count)
}

pub async fn list_runs(
    pool: &PgPool,
    domain: Domain,
    filter: &RunFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<RunRecord>, StoreError> {
    let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
        "SELECT {RUN_COLUMNS} FROM {} WHERE 1=1",
        domain.table(),
    ));
    push_filter(&mut qb, filter);

    qb.push(" ORDER BY submitted_date DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let records = qb.build_query_as::<RunRecord>().fetch_all(pool).await?;
    Ok(records)
}

pub async fn mark_run_completed(
    pool: &PgPool,
    domain: Domain,
    id: i64,
    completed_date: DateTime<Utc>,
    status: RunStatus,
) -> Result<(), StoreError> {
    let sql = format!(
        "UPDATE {table} SET completed_date = $2, status = $3 WHERE id = $1",
        table = domain.table(),
    );

    sqlx::query(&sql)
        .bind(id)
        .bind(completed_date)
        .bind(status.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Append the dynamic predicate conjunction for the supplied filters. The
/// status filter is deliberately not part of this: status lives in the
/// runtime, not the database.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &RunFilter) {
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (workflow_id ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR definition->>'name' ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    if let Some(ts) = filter.submitted_after {
        qb.push(" AND submitted_date >= ");
        qb.push_bind(ts);
    }
    if let Some(ts) = filter.submitted_before {
        qb.push(" AND submitted_date <= ");
        qb.push_bind(ts);
    }
    if let Some(ts) = filter.completed_after {
        qb.push(" AND completed_date >= ");
        qb.push_bind(ts);
    }
    if let Some(ts) = filter.completed_before {
        qb.push(" AND completed_date <= ");
        qb.push_bind(ts);
    }
}
