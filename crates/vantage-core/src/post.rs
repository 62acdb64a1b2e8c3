use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::Relationship;

/// Source platform a post was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Youtube,
    Twitter,
    Unknown,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Instagram => write!(f, "instagram"),
            Platform::Tiktok => write!(f, "tiktok"),
            Platform::Youtube => write!(f, "youtube"),
            Platform::Twitter => write!(f, "twitter"),
            Platform::Unknown => write!(f, "unknown"),
        }
    }
}

impl Platform {
    /// Parse a stored platform string. Unrecognized values map to `Unknown`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "instagram" => Platform::Instagram,
            "tiktok" => Platform::Tiktok,
            "youtube" => Platform::Youtube,
            "twitter" => Platform::Twitter,
            _ => Platform::Unknown,
        }
    }
}

/// Media format of a post. Doubles as the "format" dimension in trend and
/// gap analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Carousel,
    Text,
    Unknown,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
            MediaType::Carousel => write!(f, "carousel"),
            MediaType::Text => write!(f, "text"),
            MediaType::Unknown => write!(f, "unknown"),
        }
    }
}

impl MediaType {
    /// Parse a stored media-type string. Unrecognized values map to `Unknown`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "image" => MediaType::Image,
            "video" => MediaType::Video,
            "carousel" => MediaType::Carousel,
            "text" => MediaType::Text,
            _ => MediaType::Unknown,
        }
    }
}

/// Raw engagement counts at collection time. Every count is optional —
/// platforms expose different subsets and collectors may fail partially.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounts {
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub saves: Option<i64>,
    pub shares: Option<i64>,
    pub views: Option<i64>,
}

/// Categorical annotations supplied by the external content classifier.
///
/// Fixed schema rather than a free-form JSON blob so a typo'd key is a
/// compile error, not a silently dropped dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    pub hook_type: Option<String>,
    pub content_pattern: Option<String>,
    pub emotional_trigger: Option<String>,
}

impl Annotations {
    /// True when no dimension is populated. Such posts still participate in
    /// engagement-based detection but contribute nothing to trend tallies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hook_type.is_none() && self.content_pattern.is_none() && self.emotional_trigger.is_none()
    }
}

/// One observed social post.
///
/// Created by the collector; the outlier flag, score, and content tags are
/// mutated by each detection run. Posts are archived (never deleted) when
/// their owning account is removed so restoration is instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Platform-native identifier, dedup key together with `platform`.
    pub external_id: String,
    pub platform: Platform,
    pub account_handle: String,
    pub relationship: Relationship,
    pub caption: String,
    pub media_type: MediaType,
    pub counts: EngagementCounts,
    pub follower_count: Option<i64>,
    /// Platform audio-track identifier, when the post uses one.
    pub audio_id: Option<String>,
    pub collected_at: DateTime<Utc>,
    pub annotations: Annotations,
    pub is_outlier: bool,
    pub outlier_score: Option<f64>,
    pub content_tags: Vec<String>,
    pub archived: bool,
}

impl Post {
    /// Extract hashtags from the caption: lowercase, `#` stripped, order
    /// preserved, duplicates removed.
    #[must_use]
    pub fn hashtags(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut tags = Vec::new();
        for word in self.caption.split_whitespace() {
            let Some(raw) = word.strip_prefix('#') else {
                continue;
            };
            let tag: String = raw
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
                .to_lowercase();
            if tag.is_empty() {
                continue;
            }
            if seen.insert(tag.clone()) {
                tags.push(tag);
            }
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_caption(caption: &str) -> Post {
        Post {
            id: Uuid::new_v4(),
            external_id: "x1".to_string(),
            platform: Platform::Instagram,
            account_handle: "nike".to_string(),
            relationship: Relationship::Competitor,
            caption: caption.to_string(),
            media_type: MediaType::Video,
            counts: EngagementCounts::default(),
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

    #[test]
    fn platform_round_trips_through_display() {
        for p in [
            Platform::Instagram,
            Platform::Tiktok,
            Platform::Youtube,
            Platform::Twitter,
        ] {
            assert_eq!(Platform::parse(&p.to_string()), p);
        }
    }

    #[test]
    fn unknown_platform_string_parses_to_unknown() {
        assert_eq!(Platform::parse("myspace"), Platform::Unknown);
    }

    #[test]
    fn media_type_round_trips_through_display() {
        for m in [
            MediaType::Image,
            MediaType::Video,
            MediaType::Carousel,
            MediaType::Text,
        ] {
            assert_eq!(MediaType::parse(&m.to_string()), m);
        }
    }

    #[test]
    fn empty_annotations_detected() {
        assert!(Annotations::default().is_empty());
        let a = Annotations {
            hook_type: Some("question".to_string()),
            ..Annotations::default()
        };
        assert!(!a.is_empty());
    }

    #[test]
    fn hashtags_extracted_lowercased_and_deduped() {
        let post = post_with_caption("Big drop #RunClub today #runclub #GymLife!");
        assert_eq!(post.hashtags(), vec!["runclub", "gymlife"]);
    }

    #[test]
    fn hashtags_ignore_bare_hash_and_punctuation() {
        let post = post_with_caption("# nothing #, #real_tag.");
        assert_eq!(post.hashtags(), vec!["real_tag"]);
    }

    #[test]
    fn caption_without_hashtags_yields_empty() {
        let post = post_with_caption("no tags here");
        assert!(post.hashtags().is_empty());
    }
}
