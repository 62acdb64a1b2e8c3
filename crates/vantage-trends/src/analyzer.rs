//! Velocity classification of categorical trend snapshots.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::snapshot::TrendSnapshot;
use crate::stats;

/// Velocity above which a value is rising, below whose negation declining.
const DIRECTION_THRESHOLD: f64 = 0.15;
/// How many values each direction list carries.
const TOP_N: usize = 5;
const NARRATIVE_RISERS: usize = 3;
const NARRATIVE_DECLINERS: usize = 2;

/// Categorical dimension a trend value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    HookType,
    ContentPattern,
    Format,
    EmotionalTrigger,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::HookType => write!(f, "hook type"),
            Dimension::ContentPattern => write!(f, "content pattern"),
            Dimension::Format => write!(f, "format"),
            Dimension::EmotionalTrigger => write!(f, "emotional trigger"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Declining,
    Stable,
}

/// One categorical value with its fitted velocity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendItem {
    pub dimension: Dimension,
    pub value: String,
    /// Fractional rate of change per snapshot (regression slope / mean).
    pub velocity: f64,
    pub direction: TrendDirection,
    pub latest_count: i64,
    pub mean_count: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub snapshot_count: usize,
    /// Top risers, strongest first.
    pub rising: Vec<TrendItem>,
    /// Top decliners, most negative first.
    pub declining: Vec<TrendItem>,
    /// Most prominent stable values.
    pub stable: Vec<TrendItem>,
    pub narrative: String,
}

/// Outcome of a trend analysis: sparse data is a result, not an error.
#[derive(Debug, Clone)]
pub enum TrendOutcome {
    Report(TrendReport),
    NotEnoughData { snapshots: usize },
}

/// Analyze velocity of every categorical value across a snapshot series.
///
/// Snapshots are processed in chronological order; a value absent from a
/// snapshot counts as 0 there. Fewer than 2 snapshots yields
/// [`TrendOutcome::NotEnoughData`].
#[must_use]
pub fn analyze_trends(snapshots: &[TrendSnapshot]) -> TrendOutcome {
    if snapshots.len() < 2 {
        return TrendOutcome::NotEnoughData {
            snapshots: snapshots.len(),
        };
    }

    let mut ordered: Vec<&TrendSnapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.day);

    let mut items = Vec::new();
    for dimension in [
        Dimension::HookType,
        Dimension::ContentPattern,
        Dimension::Format,
        Dimension::EmotionalTrigger,
    ] {
        items.extend(analyze_dimension(&ordered, dimension));
    }

    let mut rising: Vec<TrendItem> = items
        .iter()
        .filter(|i| i.direction == TrendDirection::Rising)
        .cloned()
        .collect();
    rising.sort_by(|a, b| b.velocity.partial_cmp(&a.velocity).unwrap_or(std::cmp::Ordering::Equal));
    rising.truncate(TOP_N);

    let mut declining: Vec<TrendItem> = items
        .iter()
        .filter(|i| i.direction == TrendDirection::Declining)
        .cloned()
        .collect();
    declining
        .sort_by(|a, b| a.velocity.partial_cmp(&b.velocity).unwrap_or(std::cmp::Ordering::Equal));
    declining.truncate(TOP_N);

    let mut stable: Vec<TrendItem> = items
        .iter()
        .filter(|i| i.direction == TrendDirection::Stable)
        .cloned()
        .collect();
    stable.sort_by(|a, b| {
        b.mean_count
            .partial_cmp(&a.mean_count)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stable.truncate(TOP_N);

    let narrative = build_narrative(&rising, &declining, ordered.len());

    TrendOutcome::Report(TrendReport {
        snapshot_count: ordered.len(),
        rising,
        declining,
        stable,
        narrative,
    })
}

fn counts_for<'a>(snapshot: &'a TrendSnapshot, dimension: Dimension) -> &'a std::collections::HashMap<String, i64> {
    match dimension {
        Dimension::HookType => &snapshot.hook_counts,
        Dimension::ContentPattern => &snapshot.pattern_counts,
        Dimension::Format => &snapshot.format_counts,
        Dimension::EmotionalTrigger => &snapshot.trigger_counts,
    }
}

#[allow(clippy::cast_precision_loss)]
fn analyze_dimension(ordered: &[&TrendSnapshot], dimension: Dimension) -> Vec<TrendItem> {
    let values: BTreeSet<&String> = ordered
        .iter()
        .flat_map(|s| counts_for(s, dimension).keys())
        .collect();

    values
        .into_iter()
        .map(|value| {
            let series: Vec<f64> = ordered
                .iter()
                .map(|s| counts_for(s, dimension).get(value).copied().unwrap_or(0) as f64)
                .collect();

            let velocity = stats::velocity(&series);
            let direction = if velocity > DIRECTION_THRESHOLD {
                TrendDirection::Rising
            } else if velocity < -DIRECTION_THRESHOLD {
                TrendDirection::Declining
            } else {
                TrendDirection::Stable
            };

            #[allow(clippy::cast_possible_truncation)]
            let latest_count = series.last().copied().unwrap_or(0.0) as i64;
            let mean_count = series.iter().sum::<f64>() / series.len() as f64;

            TrendItem {
                dimension,
                value: value.clone(),
                velocity,
                direction,
                latest_count,
                mean_count,
            }
        })
        .collect()
}

fn describe(item: &TrendItem) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let pct = (item.velocity * 100.0).round() as i64;
    format!("'{}' ({}, {pct:+}% per snapshot)", item.value, item.dimension)
}

/// Human-readable summary naming the strongest risers and decliners.
fn build_narrative(rising: &[TrendItem], declining: &[TrendItem], snapshot_count: usize) -> String {
    if rising.is_empty() && declining.is_empty() {
        return format!(
            "No strong movement across {snapshot_count} snapshots; the categorical mix is holding steady."
        );
    }

    let mut parts = Vec::new();

    if !rising.is_empty() {
        let named: Vec<String> = rising.iter().take(NARRATIVE_RISERS).map(describe).collect();
        parts.push(format!("Gaining momentum: {}", named.join(", ")));
    }
    if !declining.is_empty() {
        let named: Vec<String> = declining
            .iter()
            .take(NARRATIVE_DECLINERS)
            .map(describe)
            .collect();
        parts.push(format!("fading: {}", named.join(", ")));
    }

    format!("Across {snapshot_count} snapshots — {}.", parts.join("; "))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;

    fn snapshot(day_offset: u32, hooks: &[(&str, i64)]) -> TrendSnapshot {
        let mut hook_counts = HashMap::new();
        for (k, v) in hooks {
            hook_counts.insert((*k).to_string(), *v);
        }
        TrendSnapshot {
            account_set: "demo".to_string(),
            day: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap() + chrono::Days::new(u64::from(day_offset)),
            hook_counts,
            pattern_counts: HashMap::new(),
            format_counts: HashMap::new(),
            trigger_counts: HashMap::new(),
            outlier_count: 1,
            avg_outlier_score: 1.0,
        }
    }

    fn report(outcome: TrendOutcome) -> TrendReport {
        match outcome {
            TrendOutcome::Report(r) => r,
            TrendOutcome::NotEnoughData { snapshots } => {
                panic!("expected a report, got NotEnoughData with {snapshots} snapshots")
            }
        }
    }

    #[test]
    fn fewer_than_two_snapshots_is_not_enough_data() {
        let outcome = analyze_trends(&[snapshot(0, &[("question", 5)])]);
        assert!(matches!(outcome, TrendOutcome::NotEnoughData { snapshots: 1 }));
    }

    #[test]
    fn collapsing_hook_classified_declining() {
        let snapshots = vec![
            snapshot(0, &[("question", 10)]),
            snapshot(1, &[("question", 8)]),
            snapshot(2, &[("question", 4)]),
            snapshot(3, &[("question", 2)]),
        ];

        let r = report(analyze_trends(&snapshots));

        let item = r
            .declining
            .iter()
            .find(|i| i.value == "question")
            .expect("question should be in the declining list");
        assert!(item.velocity < -0.15, "velocity {}", item.velocity);
        assert_eq!(item.dimension, Dimension::HookType);
    }

    #[test]
    fn growing_hook_classified_rising() {
        let snapshots = vec![
            snapshot(0, &[("tutorial", 2)]),
            snapshot(1, &[("tutorial", 4)]),
            snapshot(2, &[("tutorial", 6)]),
            snapshot(3, &[("tutorial", 8)]),
        ];

        let r = report(analyze_trends(&snapshots));

        let item = r
            .rising
            .iter()
            .find(|i| i.value == "tutorial")
            .expect("tutorial should be rising");
        assert!((item.velocity - 0.4).abs() < 1e-9);
    }

    #[test]
    fn constant_value_classified_stable() {
        let snapshots = vec![
            snapshot(0, &[("question", 5)]),
            snapshot(1, &[("question", 5)]),
            snapshot(2, &[("question", 5)]),
        ];

        let r = report(analyze_trends(&snapshots));

        assert!(r.rising.is_empty());
        assert!(r.declining.is_empty());
        assert_eq!(r.stable.len(), 1);
        assert_eq!(r.stable[0].velocity, 0.0);
    }

    #[test]
    fn value_missing_from_a_snapshot_counts_as_zero() {
        // "meme" vanishes after day 0; series [6, 0, 0] is strongly negative.
        let snapshots = vec![
            snapshot(0, &[("meme", 6)]),
            snapshot(1, &[]),
            snapshot(2, &[]),
        ];

        let r = report(analyze_trends(&snapshots));

        let item = r
            .declining
            .iter()
            .find(|i| i.value == "meme")
            .expect("meme should be declining");
        assert!(item.velocity < -0.15);
        assert_eq!(item.latest_count, 0);
    }

    #[test]
    fn lists_are_capped_at_five() {
        let rising_values: Vec<(String, i64)> =
            (0..8).map(|i| (format!("hook-{i}"), 1)).collect();
        let first: Vec<(&str, i64)> = rising_values.iter().map(|(k, _)| (k.as_str(), 1)).collect();
        let second: Vec<(&str, i64)> =
            rising_values.iter().map(|(k, _)| (k.as_str(), 10)).collect();

        let snapshots = vec![snapshot(0, &first), snapshot(1, &second)];
        let r = report(analyze_trends(&snapshots));

        assert_eq!(r.rising.len(), 5);
    }

    #[test]
    fn narrative_names_strongest_movers() {
        let snapshots = vec![
            snapshot(0, &[("question", 2), ("meme", 10)]),
            snapshot(1, &[("question", 6), ("meme", 4)]),
            snapshot(2, &[("question", 10), ("meme", 2)]),
        ];

        let r = report(analyze_trends(&snapshots));

        assert!(r.narrative.contains("question"), "narrative: {}", r.narrative);
        assert!(r.narrative.contains("meme"), "narrative: {}", r.narrative);
        assert!(r.narrative.contains("3 snapshots"), "narrative: {}", r.narrative);
    }

    #[test]
    fn quiet_series_produces_steady_narrative() {
        let snapshots = vec![
            snapshot(0, &[("question", 5)]),
            snapshot(1, &[("question", 5)]),
        ];

        let r = report(analyze_trends(&snapshots));
        assert!(
            r.narrative.contains("holding steady"),
            "narrative: {}",
            r.narrative
        );
    }
}
