//! Hourly trend radar over tracked items (sounds and hashtags).
//!
//! Finer-grained than the daily analyzer: accumulates an hourly usage
//! series per item and blends velocity, acceleration, outlier correlation,
//! engagement percentile, and recency into a 0–100 composite used for
//! forward-looking ranking.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vantage_core::Post;
use vantage_detect::weighted_engagement;

use crate::stats;

/// An item must appear in at least this many posts within the hour before
/// it is tracked at all.
const MIN_TRACKED_USAGE: i64 = 2;

/// Composite sub-score weights. Velocity dominates: the radar exists to
/// surface what is moving, not what is merely big.
const WEIGHT_VELOCITY: f64 = 0.40;
const WEIGHT_OUTLIER_CORRELATION: f64 = 0.20;
const WEIGHT_ENGAGEMENT_PERCENTILE: f64 = 0.15;
const WEIGHT_RECENCY: f64 = 0.15;
const WEIGHT_ACCELERATION: f64 = 0.10;

/// Hours for the recency decay denominator (half-life ≈ 33 h).
const RECENCY_DECAY_HOURS: f64 = 48.0;

const PEAKING_VELOCITY_FLOOR: f64 = 0.1;
const PEAKING_ACCELERATION_CEIL: f64 = -0.05;
const STRONG_COMPOSITE_FLOOR: f64 = 70.0;
const STRONG_MIN_SNAPSHOTS: usize = 3;
const MODERATE_COMPOSITE_FLOOR: f64 = 40.0;

/// Kind of tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Sound,
    Hashtag,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Sound => write!(f, "sound"),
            ItemKind::Hashtag => write!(f, "hashtag"),
        }
    }
}

impl ItemKind {
    /// Parse a stored kind string. Unrecognized values map to `Hashtag`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "sound" => ItemKind::Sound,
            _ => ItemKind::Hashtag,
        }
    }
}

/// One hourly observation of a tracked item, keyed by
/// (account set, kind, item, hour). Re-capturing the same hour overwrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarSnapshot {
    pub account_set: String,
    pub kind: ItemKind,
    pub item_id: String,
    pub bucket_hour: DateTime<Utc>,
    pub usage_count: i64,
    pub outlier_count: i64,
    pub total_engagement: f64,
    pub avg_engagement: f64,
    /// Highest-engagement post using the item this hour.
    pub top_post_id: Option<Uuid>,
}

/// Lifecycle phase of a tracked item's series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPhase {
    Emerging,
    Rising,
    Peaking,
    Declining,
}

impl std::fmt::Display for TrendPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendPhase::Emerging => write!(f, "emerging"),
            TrendPhase::Rising => write!(f, "rising"),
            TrendPhase::Peaking => write!(f, "peaking"),
            TrendPhase::Declining => write!(f, "declining"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Strong,
    Moderate,
    Emerging,
}

impl std::fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalStrength::Strong => write!(f, "strong"),
            SignalStrength::Moderate => write!(f, "moderate"),
            SignalStrength::Emerging => write!(f, "emerging"),
        }
    }
}

/// One ranked radar entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarTrend {
    pub rank: usize,
    pub kind: ItemKind,
    pub item_id: String,
    pub velocity: f64,
    pub acceleration: f64,
    /// Latest-snapshot outlier share of usage.
    pub outlier_correlation: f64,
    /// Composite score in [0, 100].
    pub composite: f64,
    pub phase: TrendPhase,
    pub signal: SignalStrength,
    pub snapshot_count: usize,
    pub latest_usage: i64,
    pub avg_engagement: f64,
    pub top_post_id: Option<Uuid>,
}

/// Capture this hour's radar snapshots from current non-archived posts.
///
/// Items (a post's audio track and each caption hashtag) are tallied per
/// hour; only items used at least twice are tracked. Output order is
/// deterministic (kind, then item id).
#[must_use]
pub fn build_radar_snapshots(
    account_set: &str,
    posts: &[Post],
    now: DateTime<Utc>,
) -> Vec<RadarSnapshot> {
    struct Tally {
        usage: i64,
        outliers: i64,
        total_engagement: f64,
        top: Option<(Uuid, f64)>,
    }

    let bucket_hour = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
    let mut tallies: BTreeMap<(ItemKind, String), Tally> = BTreeMap::new();

    for post in posts {
        if post.archived {
            continue;
        }

        let mut items: Vec<(ItemKind, String)> = Vec::new();
        if let Some(audio) = &post.audio_id {
            items.push((ItemKind::Sound, audio.clone()));
        }
        for tag in post.hashtags() {
            items.push((ItemKind::Hashtag, tag));
        }

        let engagement = weighted_engagement(&post.counts);
        for key in items {
            let tally = tallies.entry(key).or_insert(Tally {
                usage: 0,
                outliers: 0,
                total_engagement: 0.0,
                top: None,
            });
            tally.usage += 1;
            if post.is_outlier {
                tally.outliers += 1;
            }
            tally.total_engagement += engagement;
            match tally.top {
                Some((_, best)) if best >= engagement => {}
                _ => tally.top = Some((post.id, engagement)),
            }
        }
    }

    tallies
        .into_iter()
        .filter(|(_, t)| t.usage >= MIN_TRACKED_USAGE)
        .map(|((kind, item_id), t)| {
            #[allow(clippy::cast_precision_loss)]
            let avg = t.total_engagement / t.usage as f64;
            RadarSnapshot {
                account_set: account_set.to_string(),
                kind,
                item_id,
                bucket_hour,
                usage_count: t.usage,
                outlier_count: t.outliers,
                total_engagement: t.total_engagement,
                avg_engagement: avg,
                top_post_id: t.top.map(|(id, _)| id),
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_minutes() as f64 / 60.0
}

/// Usage-count velocity of a chronological series, over real elapsed hours.
#[allow(clippy::cast_precision_loss)]
fn series_velocity(series: &[&RadarSnapshot]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let origin = series[0].bucket_hour;
    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|s| (elapsed_hours(origin, s.bucket_hour), s.usage_count as f64))
        .collect();
    stats::velocity_over_hours(&points)
}

/// Change in velocity between the first and second half of the series.
/// Needs at least 4 points to split meaningfully.
fn series_acceleration(series: &[&RadarSnapshot]) -> f64 {
    if series.len() < 4 {
        return 0.0;
    }
    let mid = series.len() / 2;
    series_velocity(&series[mid..]) - series_velocity(&series[..mid])
}

/// Rank all tracked items by composite score.
///
/// `snapshots` is the full lookback window across items; the series for
/// each item is reassembled here. Output is sorted by composite descending
/// and truncated to `limit`, with 1-based ranks.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rank_trends(
    snapshots: &[RadarSnapshot],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<RadarTrend> {
    let mut by_item: BTreeMap<(ItemKind, &str), Vec<&RadarSnapshot>> = BTreeMap::new();
    for snapshot in snapshots {
        by_item
            .entry((snapshot.kind, snapshot.item_id.as_str()))
            .or_default()
            .push(snapshot);
    }
    for series in by_item.values_mut() {
        series.sort_by_key(|s| s.bucket_hour);
    }

    let latest_engagements: Vec<f64> = by_item
        .values()
        .filter_map(|series| series.last().map(|s| s.avg_engagement))
        .collect();

    let mut trends: Vec<RadarTrend> = by_item
        .into_iter()
        .map(|((kind, item_id), series)| {
            let latest = series[series.len() - 1];
            let first = series[0];

            let velocity = series_velocity(&series);
            let acceleration = series_acceleration(&series);
            let outlier_correlation =
                latest.outlier_count as f64 / latest.usage_count.max(1) as f64;

            let velocity_score = stats::sigmoid(velocity * 2.0) * 100.0;
            let correlation_score = (outlier_correlation * 100.0).min(100.0);
            let engagement_score = stats::percentile_rank(&latest_engagements, latest.avg_engagement);
            let hours_alive = elapsed_hours(first.bucket_hour, now).max(0.0);
            let recency_score = (-hours_alive / RECENCY_DECAY_HOURS).exp() * 100.0;
            let acceleration_score = stats::sigmoid(acceleration * 5.0) * 100.0;

            let composite = WEIGHT_VELOCITY * velocity_score
                + WEIGHT_OUTLIER_CORRELATION * correlation_score
                + WEIGHT_ENGAGEMENT_PERCENTILE * engagement_score
                + WEIGHT_RECENCY * recency_score
                + WEIGHT_ACCELERATION * acceleration_score;

            let phase = if series.len() < 2 {
                TrendPhase::Emerging
            } else if velocity <= 0.0 {
                TrendPhase::Declining
            } else if velocity > PEAKING_VELOCITY_FLOOR && acceleration < PEAKING_ACCELERATION_CEIL
            {
                TrendPhase::Peaking
            } else {
                TrendPhase::Rising
            };

            let signal = if composite >= STRONG_COMPOSITE_FLOOR && series.len() >= STRONG_MIN_SNAPSHOTS
            {
                SignalStrength::Strong
            } else if composite >= MODERATE_COMPOSITE_FLOOR {
                SignalStrength::Moderate
            } else {
                SignalStrength::Emerging
            };

            RadarTrend {
                rank: 0,
                kind,
                item_id: item_id.to_string(),
                velocity,
                acceleration,
                outlier_correlation,
                composite,
                phase,
                signal,
                snapshot_count: series.len(),
                latest_usage: latest.usage_count,
                avg_engagement: latest.avg_engagement,
                top_post_id: latest.top_post_id,
            }
        })
        .collect();

    trends.sort_by(|a, b| {
        b.composite
            .partial_cmp(&a.composite)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    trends.truncate(limit);
    for (i, trend) in trends.iter_mut().enumerate() {
        trend.rank = i + 1;
    }

    trends
}
