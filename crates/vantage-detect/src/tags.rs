//! Heuristic content tagging for flagged posts.
//!
//! Purely deterministic string matching over the caption plus the media
//! type. No classifier involvement — these tags exist so a reader of the
//! outlier report can see at a glance what kind of content spiked.

use vantage_core::MediaType;

/// Caption keyword → content tag. Keys are matched case-insensitively as
/// substrings of the caption.
const THEME_KEYWORDS: &[(&str, &str)] = &[
    ("how to", "educational"),
    ("tutorial", "educational"),
    ("guide", "educational"),
    ("tip", "tips"),
    ("hack", "tips"),
    ("giveaway", "giveaway"),
    ("win a", "giveaway"),
    ("sale", "promotion"),
    ("discount", "promotion"),
    ("% off", "promotion"),
    ("behind the scenes", "behind-the-scenes"),
    ("bts", "behind-the-scenes"),
    ("story", "storytelling"),
    ("journey", "storytelling"),
    ("challenge", "challenge"),
];

const SHORT_CAPTION_MAX: usize = 100;
const MEDIUM_CAPTION_MAX: usize = 500;

/// Derive content tags from a caption and media type.
///
/// Emits one caption-length bucket, any matched theme keywords (deduped),
/// a "question" tag when the caption asks one, and a media-type tag.
#[must_use]
pub fn content_tags(caption: &str, media_type: MediaType) -> Vec<String> {
    let mut tags = Vec::new();

    let length = caption.chars().count();
    let bucket = if length < SHORT_CAPTION_MAX {
        "short-caption"
    } else if length < MEDIUM_CAPTION_MAX {
        "medium-caption"
    } else {
        "long-caption"
    };
    tags.push(bucket.to_string());

    let lowered = caption.to_lowercase();
    for &(keyword, tag) in THEME_KEYWORDS {
        if lowered.contains(keyword) && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    if lowered.contains('?') && !tags.iter().any(|t| t == "question") {
        tags.push("question".to_string());
    }

    tags.push(format!("{media_type}-post"));

    tags
}
