//! Engagement-based outlier detection for vantage.
//!
//! Computes weighted engagement per post, builds per-account statistical
//! baselines over a lookback window, and flags posts whose engagement is
//! anomalously high relative to their own account's baseline. Pure
//! computation — callers supply post slices and persist the results.

pub mod baseline;
pub mod engagement;
pub mod outlier;
pub mod tags;

pub use baseline::{compute_baseline, AccountBaseline, MIN_BASELINE_POSTS};
pub use engagement::{primary_driver, weighted_engagement, EngagementDriver};
pub use outlier::{detect_outliers, evaluate_post, DetectionReport, OutlierPost};
pub use tags::content_tags;
