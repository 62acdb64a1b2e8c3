//! Database operations for the `detection_runs` table.
//!
//! Every batch (detection, snapshot capture) records a run row so
//! operators can audit what executed, when, and with what outcome.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `detection_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DetectionRunRow {
    pub id: i64,
    pub account_set: String,
    pub kind: String,
    pub status: String,
    pub triggered_by: String,
    pub records_processed: Option<i32>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Create a pending run of the given kind (`detect`, `capture`, ...).
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn create_detection_run(
    pool: &PgPool,
    account_set: &str,
    kind: &str,
    triggered_by: &str,
) -> Result<DetectionRunRow, DbError> {
    let row = sqlx::query_as::<_, DetectionRunRow>(
        "INSERT INTO detection_runs (account_set, kind, triggered_by) \
         VALUES ($1, $2, $3) \
         RETURNING id, account_set, kind, status, triggered_by, records_processed, \
                   error, created_at, started_at, finished_at",
    )
    .bind(account_set)
    .bind(kind)
    .bind(triggered_by)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Mark a run as started.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn start_detection_run(pool: &PgPool, run_id: i64) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE detection_runs SET status = 'running', started_at = NOW() WHERE id = $1",
    )
    .bind(run_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Mark a run as completed with its processed-record count.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn complete_detection_run(
    pool: &PgPool,
    run_id: i64,
    records_processed: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE detection_runs SET status = 'succeeded', records_processed = $2, \
                finished_at = NOW() \
         WHERE id = $1",
    )
    .bind(run_id)
    .bind(records_processed)
    .execute(pool)
    .await?;
    Ok(())
}

/// Mark a run as failed with an error message.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn fail_detection_run(pool: &PgPool, run_id: i64, error: &str) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE detection_runs SET status = 'failed', error = $2, finished_at = NOW() \
         WHERE id = $1",
    )
    .bind(run_id)
    .bind(error)
    .execute(pool)
    .await?;
    Ok(())
}
