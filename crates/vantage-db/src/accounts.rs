//! Database operations for the `accounts` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `accounts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub account_set: String,
    pub handle: String,
    pub platform: String,
    pub relationship: String,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Upsert an account into a set. Returns the internal ID.
/// Dedup key: (`account_set`, `platform`, `handle`).
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn upsert_account(
    pool: &PgPool,
    account_set: &str,
    handle: &str,
    platform: &str,
    relationship: &str,
    display_name: Option<&str>,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO accounts (account_set, handle, platform, relationship, display_name) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (account_set, platform, handle) DO UPDATE SET \
           relationship = EXCLUDED.relationship, \
           display_name = COALESCE(EXCLUDED.display_name, accounts.display_name), \
           updated_at = NOW() \
         RETURNING id",
    )
    .bind(account_set)
    .bind(handle)
    .bind(platform)
    .bind(relationship)
    .bind(display_name)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// List all active accounts in a set, own channel first, then by handle.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn list_active_accounts(
    pool: &PgPool,
    account_set: &str,
) -> Result<Vec<AccountRow>, DbError> {
    let rows = sqlx::query_as::<_, AccountRow>(
        "SELECT id, account_set, handle, platform, relationship, display_name, \
                is_active, created_at \
         FROM accounts \
         WHERE account_set = $1 AND is_active = true \
         ORDER BY relationship DESC, handle",
    )
    .bind(account_set)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch one account by handle within a set, active or not.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn get_account_by_handle(
    pool: &PgPool,
    account_set: &str,
    handle: &str,
) -> Result<Option<AccountRow>, DbError> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT id, account_set, handle, platform, relationship, display_name, \
                is_active, created_at \
         FROM accounts \
         WHERE account_set = $1 AND handle = $2",
    )
    .bind(account_set)
    .bind(handle)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Deactivate an account and archive all of its posts.
///
/// Posts are soft-deleted only — [`reactivate_account`] restores them
/// instantly. Returns the number of posts archived.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the handle is unknown in the set, or
/// `DbError` on query failure.
pub async fn deactivate_account(
    pool: &PgPool,
    account_set: &str,
    handle: &str,
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;

    let account_id: Option<i64> = sqlx::query_scalar(
        "UPDATE accounts SET is_active = false, updated_at = NOW() \
         WHERE account_set = $1 AND handle = $2 \
         RETURNING id",
    )
    .bind(account_set)
    .bind(handle)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(account_id) = account_id else {
        return Err(DbError::NotFound);
    };

    let archived = sqlx::query(
        "UPDATE posts SET archived = true, updated_at = NOW() WHERE account_id = $1",
    )
    .bind(account_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    Ok(archived)
}

/// Reactivate an account and restore its archived posts.
///
/// Returns the number of posts restored.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the handle is unknown in the set, or
/// `DbError` on query failure.
pub async fn reactivate_account(
    pool: &PgPool,
    account_set: &str,
    handle: &str,
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;

    let account_id: Option<i64> = sqlx::query_scalar(
        "UPDATE accounts SET is_active = true, updated_at = NOW() \
         WHERE account_set = $1 AND handle = $2 \
         RETURNING id",
    )
    .bind(account_set)
    .bind(handle)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(account_id) = account_id else {
        return Err(DbError::NotFound);
    };

    let restored = sqlx::query(
        "UPDATE posts SET archived = false, updated_at = NOW() WHERE account_id = $1",
    )
    .bind(account_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    Ok(restored)
}
