//! Per-account engagement baselines.

use serde::{Deserialize, Serialize};
use vantage_core::Post;

use crate::engagement::weighted_engagement;

/// Minimum posts an account needs inside the lookback window before a
/// baseline is meaningful.
pub const MIN_BASELINE_POSTS: usize = 3;

/// Summary statistics of one account's weighted engagement over the
/// lookback window. Recomputed from scratch on every detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBaseline {
    pub account_handle: String,
    pub post_count: usize,
    /// Mean weighted engagement.
    pub mean: f64,
    /// Median weighted engagement.
    pub median: f64,
    /// Sample standard deviation of weighted engagement (0.0 when n == 1).
    pub std_dev: f64,
    /// Mean raw like count, for reporting only.
    pub mean_likes: f64,
    /// Mean raw comment count, for reporting only.
    pub mean_comments: f64,
}

/// Compute the baseline for one account from its windowed posts.
///
/// Returns `None` when fewer than [`MIN_BASELINE_POSTS`] posts qualify —
/// the account is skipped for the run and contributes no outliers.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_baseline(account_handle: &str, posts: &[&Post]) -> Option<AccountBaseline> {
    if posts.len() < MIN_BASELINE_POSTS {
        return None;
    }

    let engagements: Vec<f64> = posts.iter().map(|p| weighted_engagement(&p.counts)).collect();
    let n = engagements.len() as f64;

    let mean = engagements.iter().sum::<f64>() / n;

    let std_dev = if engagements.len() > 1 {
        let variance = engagements
            .iter()
            .map(|e| (e - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        variance.sqrt()
    } else {
        0.0
    };

    let mut sorted = engagements;
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    let mean_likes = posts.iter().map(|p| p.counts.likes.unwrap_or(0)).sum::<i64>() as f64 / n;
    let mean_comments =
        posts.iter().map(|p| p.counts.comments.unwrap_or(0)).sum::<i64>() as f64 / n;

    Some(AccountBaseline {
        account_handle: account_handle.to_string(),
        post_count: posts.len(),
        mean,
        median,
        std_dev,
        mean_likes,
        mean_comments,
    })
}
