//! Weighted engagement model.

use serde::{Deserialize, Serialize};
use vantage_core::EngagementCounts;

/// Fixed engagement weights.
///
/// Saves and shares signal far higher intent than a passive like; views are
/// cheap and down-weighted.
const WEIGHT_LIKES: f64 = 1.0;
const WEIGHT_COMMENTS: f64 = 2.0;
const WEIGHT_SAVES: f64 = 4.0;
const WEIGHT_SHARES: f64 = 3.0;
const WEIGHT_VIEWS: f64 = 0.5;

/// The engagement category contributing the most to a post's weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementDriver {
    Likes,
    Comments,
    Saves,
    Shares,
    Views,
}

impl std::fmt::Display for EngagementDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngagementDriver::Likes => write!(f, "likes"),
            EngagementDriver::Comments => write!(f, "comments"),
            EngagementDriver::Saves => write!(f, "saves"),
            EngagementDriver::Shares => write!(f, "shares"),
            EngagementDriver::Views => write!(f, "views"),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn count(value: Option<i64>) -> f64 {
    value.unwrap_or(0) as f64
}

/// Weighted contribution of each category, in the fixed tie-break order.
fn weighted_parts(counts: &EngagementCounts) -> [(EngagementDriver, f64); 5] {
    [
        (EngagementDriver::Likes, count(counts.likes) * WEIGHT_LIKES),
        (EngagementDriver::Comments, count(counts.comments) * WEIGHT_COMMENTS),
        (EngagementDriver::Saves, count(counts.saves) * WEIGHT_SAVES),
        (EngagementDriver::Shares, count(counts.shares) * WEIGHT_SHARES),
        (EngagementDriver::Views, count(counts.views) * WEIGHT_VIEWS),
    ]
}

/// Compute the weighted engagement score for a set of raw counts.
///
/// Missing counts contribute 0 — collectors routinely see partial data and
/// this must never fail.
#[must_use]
pub fn weighted_engagement(counts: &EngagementCounts) -> f64 {
    weighted_parts(counts).iter().map(|(_, w)| w).sum()
}

/// The category with the largest weighted contribution.
///
/// Ties go to the earliest category in the order likes, comments, saves,
/// shares, views.
#[must_use]
pub fn primary_driver(counts: &EngagementCounts) -> EngagementDriver {
    let parts = weighted_parts(counts);
    let mut best = parts[0];
    for part in &parts[1..] {
        if part.1 > best.1 {
            best = *part;
        }
    }
    best.0
}
