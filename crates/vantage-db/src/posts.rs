//! Database operations for the `posts` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use vantage_core::{Annotations, EngagementCounts, MediaType, Platform, Post, Relationship};

use crate::DbError;

/// A post row joined with its account's handle and relationship.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub external_id: String,
    pub platform: String,
    pub account_handle: String,
    pub relationship: String,
    pub caption: String,
    pub media_type: String,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub saves: Option<i64>,
    pub shares: Option<i64>,
    pub views: Option<i64>,
    pub follower_count: Option<i64>,
    pub audio_id: Option<String>,
    pub hook_type: Option<String>,
    pub content_pattern: Option<String>,
    pub emotional_trigger: Option<String>,
    pub is_outlier: bool,
    pub outlier_score: Option<f64>,
    pub content_tags: Vec<String>,
    pub archived: bool,
    pub collected_at: DateTime<Utc>,
}

impl PostRow {
    /// Convert the row into the domain post consumed by the detection and
    /// trend crates.
    #[must_use]
    pub fn into_post(self) -> Post {
        Post {
            id: self.id,
            external_id: self.external_id,
            platform: Platform::parse(&self.platform),
            account_handle: self.account_handle,
            relationship: Relationship::parse(&self.relationship),
            caption: self.caption,
            media_type: MediaType::parse(&self.media_type),
            counts: EngagementCounts {
                likes: self.likes,
                comments: self.comments,
                saves: self.saves,
                shares: self.shares,
                views: self.views,
            },
            follower_count: self.follower_count,
            audio_id: self.audio_id,
            collected_at: self.collected_at,
            annotations: Annotations {
                hook_type: self.hook_type,
                content_pattern: self.content_pattern,
                emotional_trigger: self.emotional_trigger,
            },
            is_outlier: self.is_outlier,
            outlier_score: self.outlier_score,
            content_tags: self.content_tags,
            archived: self.archived,
        }
    }
}

/// Fields supplied by the collector when a post is first observed or
/// re-observed with fresher counts.
pub struct NewPost<'a> {
    pub external_id: &'a str,
    pub platform: &'a str,
    pub caption: &'a str,
    pub media_type: &'a str,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub saves: Option<i64>,
    pub shares: Option<i64>,
    pub views: Option<i64>,
    pub follower_count: Option<i64>,
    pub audio_id: Option<&'a str>,
    pub collected_at: DateTime<Utc>,
}

const POST_COLUMNS: &str = "p.id, p.external_id, p.platform, a.handle AS account_handle, \
     a.relationship, p.caption, p.media_type, p.likes, p.comments, p.saves, p.shares, \
     p.views, p.follower_count, p.audio_id, p.hook_type, p.content_pattern, \
     p.emotional_trigger, p.is_outlier, p.outlier_score, p.content_tags, p.archived, \
     p.collected_at";

/// Upsert a collected post. Returns the post ID.
/// Dedup key: (`platform`, `external_id`). Counts are refreshed on
/// re-collection; derived outlier fields are left untouched.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn upsert_post(
    pool: &PgPool,
    account_id: i64,
    post: &NewPost<'_>,
) -> Result<Uuid, DbError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO posts \
           (account_id, external_id, platform, caption, media_type, likes, comments, \
            saves, shares, views, follower_count, audio_id, collected_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         ON CONFLICT (platform, external_id) DO UPDATE SET \
           caption = EXCLUDED.caption, \
           media_type = EXCLUDED.media_type, \
           likes = COALESCE(EXCLUDED.likes, posts.likes), \
           comments = COALESCE(EXCLUDED.comments, posts.comments), \
           saves = COALESCE(EXCLUDED.saves, posts.saves), \
           shares = COALESCE(EXCLUDED.shares, posts.shares), \
           views = COALESCE(EXCLUDED.views, posts.views), \
           follower_count = COALESCE(EXCLUDED.follower_count, posts.follower_count), \
           audio_id = COALESCE(EXCLUDED.audio_id, posts.audio_id), \
           collected_at = EXCLUDED.collected_at, \
           updated_at = NOW() \
         RETURNING id",
    )
    .bind(account_id)
    .bind(post.external_id)
    .bind(post.platform)
    .bind(post.caption)
    .bind(post.media_type)
    .bind(post.likes)
    .bind(post.comments)
    .bind(post.saves)
    .bind(post.shares)
    .bind(post.views)
    .bind(post.follower_count)
    .bind(post.audio_id)
    .bind(post.collected_at)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// All non-archived posts of an account set collected since `since`,
/// across active accounts (own and competitor alike).
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn list_posts_for_window(
    pool: &PgPool,
    account_set: &str,
    since: DateTime<Utc>,
) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} \
         FROM posts p JOIN accounts a ON a.id = p.account_id \
         WHERE a.account_set = $1 AND a.is_active = true \
           AND p.archived = false AND p.collected_at >= $2 \
         ORDER BY p.collected_at DESC"
    ))
    .bind(account_set)
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// All currently-flagged, non-archived outlier posts of an account set.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn list_flagged_posts(
    pool: &PgPool,
    account_set: &str,
) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} \
         FROM posts p JOIN accounts a ON a.id = p.account_id \
         WHERE a.account_set = $1 AND a.is_active = true \
           AND p.archived = false AND p.is_outlier = true \
         ORDER BY p.outlier_score DESC NULLS LAST"
    ))
    .bind(account_set)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// All non-archived posts of the set's own channel(s).
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn list_own_posts(pool: &PgPool, account_set: &str) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} \
         FROM posts p JOIN accounts a ON a.id = p.account_id \
         WHERE a.account_set = $1 AND a.is_active = true \
           AND a.relationship = 'own' AND p.archived = false \
         ORDER BY p.collected_at DESC"
    ))
    .bind(account_set)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Clear outlier flag, score, and tags for every post in an account set.
///
/// Each detection run calls this before re-applying flags, making the run
/// an idempotent full recompute. Returns the number of rows cleared.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn reset_outlier_flags(pool: &PgPool, account_set: &str) -> Result<u64, DbError> {
    let cleared = sqlx::query(
        "UPDATE posts SET is_outlier = false, outlier_score = NULL, \
                content_tags = '{}', updated_at = NOW() \
         FROM accounts a \
         WHERE posts.account_id = a.id AND a.account_set = $1",
    )
    .bind(account_set)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(cleared)
}

/// Flag one post as an outlier with its composite score and content tags.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn mark_outlier(
    pool: &PgPool,
    post_id: Uuid,
    score: f64,
    content_tags: &[String],
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE posts SET is_outlier = true, outlier_score = $2, \
                content_tags = $3, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(post_id)
    .bind(score)
    .bind(content_tags)
    .execute(pool)
    .await?;
    Ok(())
}

/// Store classifier annotations on a post. `None` fields are cleared so a
/// re-classification fully replaces the previous one.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn update_annotations(
    pool: &PgPool,
    post_id: Uuid,
    annotations: &Annotations,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE posts SET hook_type = $2, content_pattern = $3, \
                emotional_trigger = $4, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(post_id)
    .bind(annotations.hook_type.as_deref())
    .bind(annotations.content_pattern.as_deref())
    .bind(annotations.emotional_trigger.as_deref())
    .execute(pool)
    .await?;
    Ok(())
}
