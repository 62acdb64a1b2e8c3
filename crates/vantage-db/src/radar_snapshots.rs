//! Database operations for the `radar_snapshots` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use vantage_trends::{ItemKind, RadarSnapshot};

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct RadarSnapshotRow {
    account_set: String,
    item_kind: String,
    item_id: String,
    bucket_hour: DateTime<Utc>,
    usage_count: i64,
    outlier_count: i64,
    total_engagement: f64,
    avg_engagement: f64,
    top_post_id: Option<Uuid>,
}

impl RadarSnapshotRow {
    fn into_snapshot(self) -> RadarSnapshot {
        RadarSnapshot {
            account_set: self.account_set,
            kind: ItemKind::parse(&self.item_kind),
            item_id: self.item_id,
            bucket_hour: self.bucket_hour,
            usage_count: self.usage_count,
            outlier_count: self.outlier_count,
            total_engagement: self.total_engagement,
            avg_engagement: self.avg_engagement,
            top_post_id: self.top_post_id,
        }
    }
}

/// Upsert one hourly radar observation.
/// Dedup key: (`account_set`, `item_kind`, `item_id`, `bucket_hour`) — a
/// same-hour recapture overwrites the counts.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn upsert_radar_snapshot(
    pool: &PgPool,
    snapshot: &RadarSnapshot,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO radar_snapshots \
           (account_set, item_kind, item_id, bucket_hour, usage_count, outlier_count, \
            total_engagement, avg_engagement, top_post_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (account_set, item_kind, item_id, bucket_hour) DO UPDATE SET \
           usage_count = EXCLUDED.usage_count, \
           outlier_count = EXCLUDED.outlier_count, \
           total_engagement = EXCLUDED.total_engagement, \
           avg_engagement = EXCLUDED.avg_engagement, \
           top_post_id = EXCLUDED.top_post_id \
         RETURNING id",
    )
    .bind(&snapshot.account_set)
    .bind(snapshot.kind.to_string())
    .bind(&snapshot.item_id)
    .bind(snapshot.bucket_hour)
    .bind(snapshot.usage_count)
    .bind(snapshot.outlier_count)
    .bind(snapshot.total_engagement)
    .bind(snapshot.avg_engagement)
    .bind(snapshot.top_post_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Load all of an account set's radar snapshots since an instant, oldest
/// first per item.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn list_radar_snapshots(
    pool: &PgPool,
    account_set: &str,
    since: DateTime<Utc>,
) -> Result<Vec<RadarSnapshot>, DbError> {
    let rows = sqlx::query_as::<_, RadarSnapshotRow>(
        "SELECT account_set, item_kind, item_id, bucket_hour, usage_count, outlier_count, \
                total_engagement, avg_engagement, top_post_id \
         FROM radar_snapshots \
         WHERE account_set = $1 AND bucket_hour >= $2 \
         ORDER BY item_kind, item_id, bucket_hour",
    )
    .bind(account_set)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(RadarSnapshotRow::into_snapshot).collect())
}
