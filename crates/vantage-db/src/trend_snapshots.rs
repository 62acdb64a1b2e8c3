//! Database operations for the `trend_snapshots` table.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::Value;
use sqlx::PgPool;
use vantage_trends::TrendSnapshot;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct TrendSnapshotRow {
    account_set: String,
    snapshot_date: NaiveDate,
    hook_counts: Value,
    pattern_counts: Value,
    format_counts: Value,
    trigger_counts: Value,
    outlier_count: i32,
    avg_outlier_score: f64,
}

impl TrendSnapshotRow {
    fn into_snapshot(self) -> Result<TrendSnapshot, DbError> {
        Ok(TrendSnapshot {
            account_set: self.account_set,
            day: self.snapshot_date,
            hook_counts: serde_json::from_value(self.hook_counts)?,
            pattern_counts: serde_json::from_value(self.pattern_counts)?,
            format_counts: serde_json::from_value(self.format_counts)?,
            trigger_counts: serde_json::from_value(self.trigger_counts)?,
            outlier_count: i64::from(self.outlier_count),
            avg_outlier_score: self.avg_outlier_score,
        })
    }
}

fn counts_json(counts: &HashMap<String, i64>) -> Result<Value, DbError> {
    Ok(serde_json::to_value(counts)?)
}

/// Upsert one day's trend snapshot.
/// Dedup key: (`account_set`, `snapshot_date`) — a same-day recapture
/// overwrites the frequency tables.
///
/// # Errors
///
/// Returns `DbError` on database query failure or if a frequency table
/// cannot be serialized.
pub async fn upsert_trend_snapshot(
    pool: &PgPool,
    snapshot: &TrendSnapshot,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO trend_snapshots \
           (account_set, snapshot_date, hook_counts, pattern_counts, format_counts, \
            trigger_counts, outlier_count, avg_outlier_score) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (account_set, snapshot_date) DO UPDATE SET \
           hook_counts = EXCLUDED.hook_counts, \
           pattern_counts = EXCLUDED.pattern_counts, \
           format_counts = EXCLUDED.format_counts, \
           trigger_counts = EXCLUDED.trigger_counts, \
           outlier_count = EXCLUDED.outlier_count, \
           avg_outlier_score = EXCLUDED.avg_outlier_score, \
           updated_at = NOW() \
         RETURNING id",
    )
    .bind(&snapshot.account_set)
    .bind(snapshot.day)
    .bind(counts_json(&snapshot.hook_counts)?)
    .bind(counts_json(&snapshot.pattern_counts)?)
    .bind(counts_json(&snapshot.format_counts)?)
    .bind(counts_json(&snapshot.trigger_counts)?)
    .bind(i32::try_from(snapshot.outlier_count).unwrap_or(i32::MAX))
    .bind(snapshot.avg_outlier_score)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Load an account set's snapshots since a date, oldest first.
///
/// # Errors
///
/// Returns `DbError` on query failure or if a stored frequency table fails
/// to deserialize.
pub async fn list_trend_snapshots(
    pool: &PgPool,
    account_set: &str,
    since: NaiveDate,
) -> Result<Vec<TrendSnapshot>, DbError> {
    let rows = sqlx::query_as::<_, TrendSnapshotRow>(
        "SELECT account_set, snapshot_date, hook_counts, pattern_counts, format_counts, \
                trigger_counts, outlier_count, avg_outlier_score \
         FROM trend_snapshots \
         WHERE account_set = $1 AND snapshot_date >= $2 \
         ORDER BY snapshot_date",
    )
    .bind(account_set)
    .bind(since)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TrendSnapshotRow::into_snapshot).collect()
}
