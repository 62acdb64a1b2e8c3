//! Outlier detection over account baselines.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vantage_core::{DetectionSettings, Post, Relationship};

use crate::baseline::{compute_baseline, AccountBaseline};
use crate::engagement::{primary_driver, weighted_engagement, EngagementDriver};
use crate::tags::content_tags;

/// Relative weight of the multiplier vs. sigma term in the composite score.
/// The multiplier dominates because it is the number people actually read
/// ("3.2x the account's normal engagement").
const SCORE_MULTIPLIER_WEIGHT: f64 = 0.6;
const SCORE_SIGMA_WEIGHT: f64 = 0.4;

/// One flagged post with its detection arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierPost {
    pub post_id: Uuid,
    pub account_handle: String,
    pub weighted_engagement: f64,
    /// Ratio of weighted engagement to the account baseline mean.
    pub multiplier: f64,
    /// Standard deviations above the baseline mean (0.0 for zero-variance
    /// baselines).
    pub sigma: f64,
    /// Composite rank score, higher is more anomalous.
    pub score: f64,
    pub driver: EngagementDriver,
    pub content_tags: Vec<String>,
}

/// Result of one full detection pass over an account set.
#[derive(Debug, Clone, Default)]
pub struct DetectionReport {
    /// All flagged posts across all accounts, sorted by score descending.
    pub outliers: Vec<OutlierPost>,
    /// Baseline per account that had enough data this run.
    pub baselines: HashMap<String, AccountBaseline>,
    /// Accounts skipped for insufficient data (fewer than 3 windowed posts).
    pub skipped_accounts: Vec<String>,
}

/// Evaluate one post against its account baseline.
///
/// Returns `Some` only when the post crosses the multiplier OR sigma
/// threshold. A baseline with mean 0 can never produce an outlier.
#[must_use]
pub fn evaluate_post(
    post: &Post,
    baseline: &AccountBaseline,
    settings: &DetectionSettings,
) -> Option<OutlierPost> {
    if baseline.mean == 0.0 {
        return None;
    }

    let w = weighted_engagement(&post.counts);
    let multiplier = w / baseline.mean;
    let sigma = if baseline.std_dev > 0.0 {
        (w - baseline.mean) / baseline.std_dev
    } else {
        0.0
    };

    if multiplier < settings.engagement_multiplier_threshold && sigma < settings.std_dev_threshold
    {
        return None;
    }

    let score = SCORE_MULTIPLIER_WEIGHT * multiplier + SCORE_SIGMA_WEIGHT * sigma.max(0.0);

    Some(OutlierPost {
        post_id: post.id,
        account_handle: post.account_handle.clone(),
        weighted_engagement: w,
        multiplier,
        sigma,
        score,
        driver: primary_driver(&post.counts),
        content_tags: content_tags(&post.caption, post.media_type),
    })
}

/// Run a full detection pass over an account set's windowed posts.
///
/// Archived and own-channel posts are ignored. Accounts without enough
/// posts for a baseline are skipped and listed, not errored. The result is
/// a pure function of the input — re-running on unchanged data produces an
/// identical report.
#[must_use]
pub fn detect_outliers(posts: &[Post], settings: &DetectionSettings) -> DetectionReport {
    let mut by_account: BTreeMap<&str, Vec<&Post>> = BTreeMap::new();
    for post in posts {
        if post.archived || post.relationship != Relationship::Competitor {
            continue;
        }
        by_account.entry(post.account_handle.as_str()).or_default().push(post);
    }

    let mut report = DetectionReport::default();

    for (handle, account_posts) in by_account {
        let Some(baseline) = compute_baseline(handle, &account_posts) else {
            tracing::debug!(
                account = handle,
                posts = account_posts.len(),
                "skipping account — not enough posts for a baseline"
            );
            report.skipped_accounts.push(handle.to_string());
            continue;
        };

        for post in account_posts {
            if let Some(outlier) = evaluate_post(post, &baseline, settings) {
                report.outliers.push(outlier);
            }
        }

        report.baselines.insert(handle.to_string(), baseline);
    }

    report
        .outliers
        .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    report
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use vantage_core::{Annotations, EngagementCounts, MediaType, Platform};

    use super::*;

    fn post(handle: &str, likes: i64) -> Post {
        Post {
            id: Uuid::new_v4(),
            external_id: format!("{handle}-{likes}"),
            platform: Platform::Instagram,
            account_handle: handle.to_string(),
            relationship: Relationship::Competitor,
            caption: "caption".to_string(),
            media_type: MediaType::Image,
            counts: EngagementCounts {
                likes: Some(likes),
                ..EngagementCounts::default()
            },
            follower_count: None,
            audio_id: None,
            collected_at: Utc::now(),
            annotations: Annotations::default(),
            is_outlier: false,
            outlier_score: None,
            content_tags: Vec::new(),
            archived: false,
        }
    }

    fn baseline(mean: f64, std_dev: f64) -> AccountBaseline {
        AccountBaseline {
            account_handle: "nike".to_string(),
            post_count: 5,
            mean,
            median: mean,
            std_dev,
            mean_likes: mean,
            mean_comments: 0.0,
        }
    }

    #[test]
    fn spike_post_flagged_with_expected_arithmetic() {
        // Baseline mean 100, stdev 8.29; a 250-engagement post multiplies
        // the baseline 2.5x and sits ~18 sigma out.
        let b = baseline(100.0, 8.29);
        let p = post("nike", 250);

        let outlier = evaluate_post(&p, &b, &DetectionSettings::default())
            .expect("expected the spike to be flagged");

        assert!((outlier.multiplier - 2.5).abs() < 1e-9);
        assert!((outlier.sigma - 150.0 / 8.29).abs() < 1e-9);
        let expected_score = 0.6 * 2.5 + 0.4 * (150.0 / 8.29);
        assert!(
            (outlier.score - expected_score).abs() < 1e-9,
            "unexpected score: {}",
            outlier.score
        );
        assert_eq!(outlier.driver, EngagementDriver::Likes);
    }

    #[test]
    fn zero_mean_baseline_never_flags() {
        let b = baseline(0.0, 0.0);
        let p = post("nike", 1_000_000);
        assert!(evaluate_post(&p, &b, &DetectionSettings::default()).is_none());
    }

    #[test]
    fn zero_variance_baseline_uses_multiplier_only() {
        let b = baseline(100.0, 0.0);
        let p = post("nike", 250);

        let outlier = evaluate_post(&p, &b, &DetectionSettings::default()).unwrap();
        assert!((outlier.sigma - 0.0).abs() < f64::EPSILON);
        assert!((outlier.score - 0.6 * 2.5).abs() < 1e-9);
    }

    #[test]
    fn sigma_threshold_alone_can_flag() {
        // 1.8x multiplier is under the 2.0 threshold but 1.6 sigma crosses 1.5.
        let b = baseline(100.0, 50.0);
        let p = post("nike", 180);

        let outlier = evaluate_post(&p, &b, &DetectionSettings::default())
            .expect("sigma threshold should flag this post");
        assert!(outlier.multiplier < 2.0);
        assert!(outlier.sigma >= 1.5);
    }

    #[test]
    fn below_both_thresholds_is_not_an_outlier() {
        let b = baseline(100.0, 50.0);
        let p = post("nike", 120);
        assert!(evaluate_post(&p, &b, &DetectionSettings::default()).is_none());
    }

    #[test]
    fn composite_score_blends_multiplier_and_clamped_sigma() {
        let b = baseline(100.0, 200.0);
        let p = post("nike", 250);

        let outlier = evaluate_post(&p, &b, &DetectionSettings::default()).unwrap();
        let expected = 0.6 * outlier.multiplier + 0.4 * outlier.sigma.max(0.0);
        assert!((outlier.score - expected).abs() < 1e-9);
    }

    #[test]
    fn account_with_two_posts_contributes_nothing() {
        let mut posts: Vec<Post> = [100, 110, 95, 105, 90].map(|l| post("nike", l)).into();
        posts.push(post("adidas", 10));
        posts.push(post("adidas", 5_000));

        let report = detect_outliers(&posts, &DetectionSettings::default());

        assert!(report.skipped_accounts.contains(&"adidas".to_string()));
        assert!(!report.baselines.contains_key("adidas"));
        assert!(
            report.outliers.iter().all(|o| o.account_handle != "adidas"),
            "skipped account must produce no outliers"
        );
        assert!(report.baselines.contains_key("nike"));
    }

    #[test]
    fn archived_and_own_posts_excluded() {
        let mut posts: Vec<Post> = [100, 110, 95, 105, 90].map(|l| post("nike", l)).into();
        let mut archived = post("nike", 10_000);
        archived.archived = true;
        posts.push(archived);
        let mut own = post("ourbrand", 10_000);
        own.relationship = Relationship::Own;
        posts.push(own);

        let report = detect_outliers(&posts, &DetectionSettings::default());

        assert!(report.outliers.is_empty(), "got: {:?}", report.outliers);
        assert!(!report.baselines.contains_key("ourbrand"));
    }

    #[test]
    fn detection_is_idempotent_on_unchanged_input() {
        let mut posts: Vec<Post> = [100, 110, 95, 105, 90].map(|l| post("nike", l)).into();
        posts.push(post("nike", 400));

        let settings = DetectionSettings::default();
        let first = detect_outliers(&posts, &settings);
        let second = detect_outliers(&posts, &settings);

        let ids =
            |r: &DetectionReport| r.outliers.iter().map(|o| o.post_id).collect::<Vec<_>>();
        let scores =
            |r: &DetectionReport| r.outliers.iter().map(|o| o.score).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(scores(&first), scores(&second));
    }

    #[test]
    fn higher_engagement_never_lowers_multiplier_sigma_or_score() {
        let b = baseline(100.0, 10.0);
        let settings = DetectionSettings::default();

        let low = evaluate_post(&post("nike", 300), &b, &settings).unwrap();
        let high = evaluate_post(&post("nike", 400), &b, &settings).unwrap();

        assert!(high.multiplier >= low.multiplier);
        assert!(high.sigma >= low.sigma);
        assert!(high.score >= low.score);
    }

    #[test]
    fn outliers_sorted_by_score_descending() {
        let mut posts: Vec<Post> = [100, 110, 95, 105, 90].map(|l| post("nike", l)).into();
        posts.push(post("nike", 300));
        posts.push(post("nike", 900));
        let mut more: Vec<Post> = [10, 12, 11, 9, 10].map(|l| post("puma", l)).into();
        more.push(post("puma", 50));
        posts.append(&mut more);

        let report = detect_outliers(&posts, &DetectionSettings::default());

        assert!(report.outliers.len() >= 2);
        for pair in report.outliers.windows(2) {
            assert!(
                pair[0].score >= pair[1].score,
                "outliers out of order: {} then {}",
                pair[0].score,
                pair[1].score
            );
        }
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = detect_outliers(&[], &DetectionSettings::default());
        assert!(report.outliers.is_empty());
        assert!(report.baselines.is_empty());
        assert!(report.skipped_accounts.is_empty());
    }
}
