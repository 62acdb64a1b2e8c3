/// Tunables for one account set's detection and trend runs.
///
/// Loaded from env by `config::load_app_config`; defaults match the values
/// the detection pipeline was calibrated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionSettings {
    /// A post is an outlier once its weighted engagement reaches this many
    /// times the account baseline mean.
    pub engagement_multiplier_threshold: f64,
    /// Alternative trigger: standard deviations above the baseline mean.
    pub std_dev_threshold: f64,
    /// Baseline lookback window in days.
    pub lookback_days: i64,
    /// Trend analyzer snapshot lookback in weeks.
    pub trend_lookback_weeks: i64,
    /// Trend radar snapshot lookback in hours.
    pub radar_lookback_hours: i64,
    /// Gap analysis cache time-to-live in hours.
    pub gap_cache_ttl_hours: i64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            engagement_multiplier_threshold: 2.0,
            std_dev_threshold: 1.5,
            lookback_days: 30,
            trend_lookback_weeks: 4,
            radar_lookback_hours: 72,
            gap_cache_ttl_hours: 24,
        }
    }
}
