//! Daily categorical frequency snapshots of the outlier feed.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vantage_core::{Post, Relationship};

/// Frequency tables over one day's flagged outliers, keyed by
/// (account set, calendar day). A same-day recapture overwrites the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub account_set: String,
    pub day: NaiveDate,
    pub hook_counts: HashMap<String, i64>,
    pub pattern_counts: HashMap<String, i64>,
    pub format_counts: HashMap<String, i64>,
    pub trigger_counts: HashMap<String, i64>,
    pub outlier_count: i64,
    /// Mean composite outlier score across the day's flagged set (0.0 when
    /// no post carries a score).
    pub avg_outlier_score: f64,
}

/// Tally today's snapshot from the currently-flagged outlier posts.
///
/// Own-channel and archived posts are excluded. A post missing an
/// annotation dimension is skipped for that dimension only; its media type
/// always feeds the format table.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_daily_snapshot(account_set: &str, posts: &[Post], day: NaiveDate) -> TrendSnapshot {
    let mut snapshot = TrendSnapshot {
        account_set: account_set.to_string(),
        day,
        hook_counts: HashMap::new(),
        pattern_counts: HashMap::new(),
        format_counts: HashMap::new(),
        trigger_counts: HashMap::new(),
        outlier_count: 0,
        avg_outlier_score: 0.0,
    };

    let mut score_sum = 0.0;
    let mut score_count: usize = 0;

    for post in posts {
        if !post.is_outlier || post.archived || post.relationship != Relationship::Competitor {
            continue;
        }

        snapshot.outlier_count += 1;
        if let Some(score) = post.outlier_score {
            score_sum += score;
            score_count += 1;
        }

        if let Some(hook) = &post.annotations.hook_type {
            *snapshot.hook_counts.entry(hook.clone()).or_insert(0) += 1;
        }
        if let Some(pattern) = &post.annotations.content_pattern {
            *snapshot.pattern_counts.entry(pattern.clone()).or_insert(0) += 1;
        }
        if let Some(trigger) = &post.annotations.emotional_trigger {
            *snapshot.trigger_counts.entry(trigger.clone()).or_insert(0) += 1;
        }
        *snapshot
            .format_counts
            .entry(post.media_type.to_string())
            .or_insert(0) += 1;
    }

    if score_count > 0 {
        snapshot.avg_outlier_score = score_sum / score_count as f64;
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;
    use vantage_core::{Annotations, EngagementCounts, MediaType, Platform};

    use super::*;

    fn outlier_post(hook: Option<&str>, pattern: Option<&str>, score: f64) -> Post {
        Post {
            id: Uuid::new_v4(),
            external_id: Uuid::new_v4().to_string(),
            platform: Platform::Instagram,
            account_handle: "nike".to_string(),
            relationship: Relationship::Competitor,
            caption: String::new(),
            media_type: MediaType::Video,
            counts: EngagementCounts::default(),
            follower_count: None,
            audio_id: None,
            collected_at: Utc::now(),
            annotations: Annotations {
                hook_type: hook.map(ToString::to_string),
                content_pattern: pattern.map(ToString::to_string),
                emotional_trigger: None,
            },
            is_outlier: true,
            outlier_score: Some(score),
            content_tags: Vec::new(),
            archived: false,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn tallies_each_dimension_independently() {
        let posts = vec![
            outlier_post(Some("question"), Some("listicle"), 4.0),
            outlier_post(Some("question"), None, 2.0),
            outlier_post(Some("bold_claim"), Some("listicle"), 3.0),
        ];

        let snapshot = build_daily_snapshot("demo", &posts, day());

        assert_eq!(snapshot.outlier_count, 3);
        assert_eq!(snapshot.hook_counts.get("question"), Some(&2));
        assert_eq!(snapshot.hook_counts.get("bold_claim"), Some(&1));
        assert_eq!(snapshot.pattern_counts.get("listicle"), Some(&2));
        assert_eq!(snapshot.format_counts.get("video"), Some(&3));
        assert!(snapshot.trigger_counts.is_empty());
        assert!((snapshot.avg_outlier_score - 3.0).abs() < 1e-9);
    }

    #[test]
    fn non_outliers_and_own_posts_excluded() {
        let mut plain = outlier_post(Some("question"), None, 1.0);
        plain.is_outlier = false;
        let mut own = outlier_post(Some("question"), None, 5.0);
        own.relationship = Relationship::Own;
        let mut archived = outlier_post(Some("question"), None, 5.0);
        archived.archived = true;

        let snapshot = build_daily_snapshot("demo", &[plain, own, archived], day());

        assert_eq!(snapshot.outlier_count, 0);
        assert!(snapshot.hook_counts.is_empty());
        assert!((snapshot.avg_outlier_score - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn post_without_score_still_counts_toward_totals() {
        let mut unscored = outlier_post(Some("question"), None, 0.0);
        unscored.outlier_score = None;
        let scored = outlier_post(None, None, 6.0);

        let snapshot = build_daily_snapshot("demo", &[unscored, scored], day());

        assert_eq!(snapshot.outlier_count, 2);
        // Only the scored post feeds the mean.
        assert!((snapshot.avg_outlier_score - 6.0).abs() < 1e-9);
    }
}
