//! Content-gap analysis: what works for competitors that the own channel
//! has not tried.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use vantage_core::Post;

use crate::analyzer::Dimension;
use crate::cache::TtlCache;

/// Gaps listed per dimension are capped at this many entries.
const MAX_GAPS_PER_DIMENSION: usize = 5;
/// Own usage needed before a value counts as an established strength.
const MIN_STRENGTH_USAGE: i64 = 2;

/// A value competitors use in outliers that the own channel never posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapEntry {
    pub value: String,
    pub competitor_count: i64,
    pub own_count: i64,
}

/// A value the own channel uses repeatedly that never shows up among
/// competitor outliers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthEntry {
    pub dimension: Dimension,
    pub value: String,
    pub own_count: i64,
}

/// Result of one gap comparison. `has_data` is false when either side of
/// the comparison is empty — never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub has_data: bool,
    pub missing_hooks: Vec<GapEntry>,
    pub missing_formats: Vec<GapEntry>,
    pub missing_patterns: Vec<GapEntry>,
    pub missing_triggers: Vec<GapEntry>,
    pub own_strengths: Vec<StrengthEntry>,
    pub own_post_count: usize,
    pub competitor_outlier_count: usize,
    pub computed_at: DateTime<Utc>,
}

impl GapAnalysis {
    /// The "no data" sentinel: either no own posts or no competitor
    /// outliers to compare against.
    #[must_use]
    pub fn no_data(computed_at: DateTime<Utc>) -> Self {
        Self {
            has_data: false,
            missing_hooks: Vec::new(),
            missing_formats: Vec::new(),
            missing_patterns: Vec::new(),
            missing_triggers: Vec::new(),
            own_strengths: Vec::new(),
            own_post_count: 0,
            competitor_outlier_count: 0,
            computed_at,
        }
    }
}

fn dimension_values(post: &Post, dimension: Dimension) -> Option<String> {
    match dimension {
        Dimension::HookType => post.annotations.hook_type.clone(),
        Dimension::ContentPattern => post.annotations.content_pattern.clone(),
        Dimension::Format => Some(post.media_type.to_string()),
        Dimension::EmotionalTrigger => post.annotations.emotional_trigger.clone(),
    }
}

fn tally(posts: &[Post], dimension: Dimension) -> HashMap<String, i64> {
    let mut counts = HashMap::new();
    for post in posts {
        if let Some(value) = dimension_values(post, dimension) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }
    counts
}

/// Missing gaps for one dimension: competitor values with zero own usage,
/// strongest competitor signal first.
fn missing_for(
    own: &HashMap<String, i64>,
    competitors: &HashMap<String, i64>,
) -> Vec<GapEntry> {
    let mut missing: Vec<GapEntry> = competitors
        .iter()
        .filter(|(value, _)| own.get(*value).copied().unwrap_or(0) == 0)
        .map(|(value, count)| GapEntry {
            value: value.clone(),
            competitor_count: *count,
            own_count: 0,
        })
        .collect();

    missing.sort_by(|a, b| {
        b.competitor_count
            .cmp(&a.competitor_count)
            .then_with(|| a.value.cmp(&b.value))
    });
    missing.truncate(MAX_GAPS_PER_DIMENSION);
    missing
}

fn strengths_for(
    dimension: Dimension,
    own: &HashMap<String, i64>,
    competitors: &HashMap<String, i64>,
) -> Vec<StrengthEntry> {
    let mut strengths: Vec<StrengthEntry> = own
        .iter()
        .filter(|(value, count)| {
            **count >= MIN_STRENGTH_USAGE && competitors.get(*value).copied().unwrap_or(0) == 0
        })
        .map(|(value, count)| StrengthEntry {
            dimension,
            value: value.clone(),
            own_count: *count,
        })
        .collect();

    strengths.sort_by(|a, b| b.own_count.cmp(&a.own_count).then_with(|| a.value.cmp(&b.value)));
    strengths
}

/// Compare the own channel's distribution against competitor outliers.
///
/// Requires at least one post on each side; otherwise returns the
/// [`GapAnalysis::no_data`] sentinel.
#[must_use]
pub fn analyze_gaps(
    own_posts: &[Post],
    competitor_outliers: &[Post],
    now: DateTime<Utc>,
) -> GapAnalysis {
    if own_posts.is_empty() || competitor_outliers.is_empty() {
        return GapAnalysis::no_data(now);
    }

    let mut analysis = GapAnalysis {
        has_data: true,
        missing_hooks: Vec::new(),
        missing_formats: Vec::new(),
        missing_patterns: Vec::new(),
        missing_triggers: Vec::new(),
        own_strengths: Vec::new(),
        own_post_count: own_posts.len(),
        competitor_outlier_count: competitor_outliers.len(),
        computed_at: now,
    };

    for dimension in [
        Dimension::HookType,
        Dimension::Format,
        Dimension::ContentPattern,
        Dimension::EmotionalTrigger,
    ] {
        let own = tally(own_posts, dimension);
        let competitors = tally(competitor_outliers, dimension);

        let missing = missing_for(&own, &competitors);
        match dimension {
            Dimension::HookType => analysis.missing_hooks = missing,
            Dimension::Format => analysis.missing_formats = missing,
            Dimension::ContentPattern => analysis.missing_patterns = missing,
            Dimension::EmotionalTrigger => analysis.missing_triggers = missing,
        }

        analysis
            .own_strengths
            .extend(strengths_for(dimension, &own, &competitors));
    }

    analysis
}

/// Gap analysis with a 24-hour result cache.
///
/// One instance per account set, owned by the process driving the batch.
/// `force_refresh` recomputes and overwrites regardless of freshness.
#[derive(Debug)]
pub struct GapAnalyzer {
    cache: TtlCache<GapAnalysis>,
}

impl GapAnalyzer {
    #[must_use]
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            cache: TtlCache::new(Duration::hours(ttl_hours)),
        }
    }

    /// Cached analysis while fresh; recomputed (and re-cached) otherwise.
    pub fn analyze(
        &mut self,
        own_posts: &[Post],
        competitor_outliers: &[Post],
        now: DateTime<Utc>,
        force_refresh: bool,
    ) -> GapAnalysis {
        if !force_refresh {
            if let Some(cached) = self.cache.get(now) {
                tracing::debug!(computed_at = %cached.computed_at, "gap analysis served from cache");
                return cached.clone();
            }
        }

        let analysis = analyze_gaps(own_posts, competitor_outliers, now);
        self.cache.put(analysis.clone(), now);
        analysis
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;
    use vantage_core::{
        Annotations, EngagementCounts, MediaType, Platform, Relationship,
    };

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    fn post(relationship: Relationship, hook: Option<&str>, media: MediaType) -> Post {
        Post {
            id: Uuid::new_v4(),
            external_id: Uuid::new_v4().to_string(),
            platform: Platform::Instagram,
            account_handle: match relationship {
                Relationship::Own => "ourbrand".to_string(),
                Relationship::Competitor => "nike".to_string(),
            },
            relationship,
            caption: String::new(),
            media_type: media,
            counts: EngagementCounts::default(),
            follower_count: None,
            audio_id: None,
            collected_at: at(0),
            annotations: Annotations {
                hook_type: hook.map(ToString::to_string),
                content_pattern: None,
                emotional_trigger: None,
            },
            is_outlier: relationship == Relationship::Competitor,
            outlier_score: None,
            content_tags: Vec::new(),
            archived: false,
        }
    }

    fn own(hook: Option<&str>) -> Post {
        post(Relationship::Own, hook, MediaType::Image)
    }

    fn competitor(hook: Option<&str>) -> Post {
        post(Relationship::Competitor, hook, MediaType::Image)
    }

    #[test]
    fn missing_hook_found_with_competitor_frequency() {
        // Own: educational ×5. Competitors: curiosity_gap ×8, educational ×2.
        let own_posts: Vec<Post> = (0..5).map(|_| own(Some("educational"))).collect();
        let mut comp: Vec<Post> = (0..8).map(|_| competitor(Some("curiosity_gap"))).collect();
        comp.extend((0..2).map(|_| competitor(Some("educational"))));

        let analysis = analyze_gaps(&own_posts, &comp, at(0));

        assert!(analysis.has_data);
        assert_eq!(
            analysis.missing_hooks,
            vec![GapEntry {
                value: "curiosity_gap".to_string(),
                competitor_count: 8,
                own_count: 0,
            }]
        );
        // Own "educational" also appears in the competitor set, so it is
        // not a strength.
        assert!(analysis
            .own_strengths
            .iter()
            .all(|s| s.dimension != Dimension::HookType));
    }

    #[test]
    fn identical_distributions_have_no_gaps() {
        let own_posts = vec![own(Some("educational")), own(Some("question"))];
        let comp = vec![competitor(Some("educational")), competitor(Some("question"))];

        let analysis = analyze_gaps(&own_posts, &comp, at(0));

        assert!(analysis.has_data);
        assert!(analysis.missing_hooks.is_empty());
        assert!(analysis.missing_formats.is_empty());
        assert!(analysis.missing_patterns.is_empty());
        assert!(analysis.missing_triggers.is_empty());
    }

    #[test]
    fn empty_either_side_is_no_data() {
        let own_posts = vec![own(Some("educational"))];
        let comp = vec![competitor(Some("question"))];

        assert!(!analyze_gaps(&[], &comp, at(0)).has_data);
        assert!(!analyze_gaps(&own_posts, &[], at(0)).has_data);
    }

    #[test]
    fn repeated_own_value_absent_from_competitors_is_a_strength() {
        let own_posts = vec![
            own(Some("meme")),
            own(Some("meme")),
            own(Some("one_off")),
        ];
        let comp = vec![competitor(Some("question"))];

        let analysis = analyze_gaps(&own_posts, &comp, at(0));

        let hook_strengths: Vec<&StrengthEntry> = analysis
            .own_strengths
            .iter()
            .filter(|s| s.dimension == Dimension::HookType)
            .collect();
        assert_eq!(hook_strengths.len(), 1);
        assert_eq!(hook_strengths[0].value, "meme");
        assert_eq!(hook_strengths[0].own_count, 2);
    }

    #[test]
    fn missing_gaps_capped_and_sorted_by_competitor_count() {
        let own_posts = vec![own(None)];
        let mut comp = Vec::new();
        for (i, hook) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() {
            for _ in 0..=i {
                comp.push(competitor(Some(hook)));
            }
        }

        let analysis = analyze_gaps(&own_posts, &comp, at(0));

        assert_eq!(analysis.missing_hooks.len(), 5);
        assert_eq!(analysis.missing_hooks[0].value, "g");
        assert_eq!(analysis.missing_hooks[0].competitor_count, 7);
        assert_eq!(analysis.missing_hooks[4].value, "c");
    }

    #[test]
    fn format_dimension_compares_media_types() {
        let own_posts = vec![post(Relationship::Own, None, MediaType::Image)];
        let comp = vec![
            post(Relationship::Competitor, None, MediaType::Video),
            post(Relationship::Competitor, None, MediaType::Video),
        ];

        let analysis = analyze_gaps(&own_posts, &comp, at(0));

        assert_eq!(analysis.missing_formats.len(), 1);
        assert_eq!(analysis.missing_formats[0].value, "video");
        assert_eq!(analysis.missing_formats[0].competitor_count, 2);
    }

    #[test]
    fn analyzer_serves_cached_result_within_ttl() {
        let mut analyzer = GapAnalyzer::new(24);
        let own_posts = vec![own(Some("educational"))];
        let comp = vec![competitor(Some("question"))];

        let first = analyzer.analyze(&own_posts, &comp, at(0), false);
        assert!(first.has_data);

        // Different inputs, but the fresh cache answers.
        let cached = analyzer.analyze(&[], &[], at(10), false);
        assert!(cached.has_data);
        assert_eq!(cached.computed_at, at(0));
    }

    #[test]
    fn analyzer_recomputes_after_expiry() {
        let mut analyzer = GapAnalyzer::new(2);
        let own_posts = vec![own(Some("educational"))];
        let comp = vec![competitor(Some("question"))];

        analyzer.analyze(&own_posts, &comp, at(0), false);
        let later = analyzer.analyze(&[], &[], at(5), false);

        assert!(!later.has_data, "expired cache must recompute");
    }

    #[test]
    fn force_refresh_bypasses_fresh_cache() {
        let mut analyzer = GapAnalyzer::new(24);
        let own_posts = vec![own(Some("educational"))];
        let comp = vec![competitor(Some("question"))];

        analyzer.analyze(&own_posts, &comp, at(0), false);
        let refreshed = analyzer.analyze(&[], &[], at(1), true);

        assert!(!refreshed.has_data);
        assert_eq!(refreshed.computed_at, at(1));
    }
}
