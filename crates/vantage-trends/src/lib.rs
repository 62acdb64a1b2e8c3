//! Trend analysis over detected outliers.
//!
//! Three independent consumers of the outlier feed: a daily trend analyzer
//! over categorical dimensions, an hourly trend radar over tracked items
//! (sounds and hashtags), and a gap analyzer comparing the own channel to
//! the competitor outlier set. All computation is pure; callers load and
//! persist snapshots.

pub mod analyzer;
pub mod cache;
pub mod gaps;
pub mod radar;
pub mod snapshot;
pub mod stats;

pub use analyzer::{analyze_trends, Dimension, TrendDirection, TrendItem, TrendOutcome, TrendReport};
pub use cache::TtlCache;
pub use gaps::{analyze_gaps, GapAnalysis, GapAnalyzer, GapEntry, StrengthEntry};
pub use radar::{
    build_radar_snapshots, rank_trends, ItemKind, RadarSnapshot, RadarTrend, SignalStrength,
    TrendPhase,
};
pub use snapshot::{build_daily_snapshot, TrendSnapshot};
