//! Trend, radar, and gap command handlers for the CLI.

use chrono::{Duration, Utc};
use vantage_core::{Post, Relationship};
use vantage_db::PostRow;
use vantage_trends::{
    analyze_trends, build_daily_snapshot, build_radar_snapshots, rank_trends, GapAnalyzer,
    GapEntry, TrendOutcome, TrendReport,
};

const DEFAULT_RADAR_LIMIT: usize = 10;

/// Capture today's trend snapshot and this hour's radar snapshots.
///
/// Both captures are keyed upserts, so re-running within the same
/// day/hour overwrites rather than appends.
///
/// # Errors
///
/// Returns an error if posts cannot be loaded or snapshots cannot be
/// written.
pub(crate) async fn run_capture(
    pool: &sqlx::PgPool,
    config: &vantage_core::AppConfig,
    account_set: &str,
) -> anyhow::Result<()> {
    let now = Utc::now();

    let run = vantage_db::create_detection_run(pool, account_set, "capture", "cli").await?;
    vantage_db::start_detection_run(pool, run.id).await?;

    let result = capture_snapshots(pool, config, account_set, now).await;
    match result {
        Ok(records) => {
            vantage_db::complete_detection_run(pool, run.id, records).await?;
            Ok(())
        }
        Err(e) => {
            vantage_db::fail_detection_run(pool, run.id, &e.to_string()).await?;
            Err(e.into())
        }
    }
}

async fn capture_snapshots(
    pool: &sqlx::PgPool,
    config: &vantage_core::AppConfig,
    account_set: &str,
    now: chrono::DateTime<Utc>,
) -> Result<i32, vantage_db::DbError> {
    let flagged: Vec<Post> = vantage_db::list_flagged_posts(pool, account_set)
        .await?
        .into_iter()
        .map(PostRow::into_post)
        .collect();

    let snapshot = build_daily_snapshot(account_set, &flagged, now.date_naive());
    vantage_db::upsert_trend_snapshot(pool, &snapshot).await?;

    let since = now - Duration::days(config.detection.lookback_days);
    let windowed: Vec<Post> = vantage_db::list_posts_for_window(pool, account_set, since)
        .await?
        .into_iter()
        .map(PostRow::into_post)
        .collect();

    let radar = build_radar_snapshots(account_set, &windowed, now);
    for item in &radar {
        vantage_db::upsert_radar_snapshot(pool, item).await?;
    }

    println!(
        "captured trend snapshot for {} ({} outliers, avg score {:.2}) and {} radar items",
        snapshot.day,
        snapshot.outlier_count,
        snapshot.avg_outlier_score,
        radar.len()
    );

    let records = snapshot.outlier_count + i64::try_from(radar.len()).unwrap_or(0);
    Ok(i32::try_from(records).unwrap_or(i32::MAX))
}

/// Print the rising/declining/stable report over recent daily snapshots.
///
/// # Errors
///
/// Returns an error if snapshots cannot be loaded.
pub(crate) async fn run_trends(
    pool: &sqlx::PgPool,
    config: &vantage_core::AppConfig,
    account_set: &str,
    weeks: Option<i64>,
) -> anyhow::Result<()> {
    let weeks = weeks.unwrap_or(config.detection.trend_lookback_weeks);
    let since = Utc::now().date_naive() - Duration::weeks(weeks);
    let snapshots = vantage_db::list_trend_snapshots(pool, account_set, since).await?;

    match analyze_trends(&snapshots) {
        TrendOutcome::NotEnoughData { snapshots } => {
            println!(
                "not enough data: {snapshots} snapshots in the last {weeks} weeks (need 2+)"
            );
        }
        TrendOutcome::Report(report) => print_trend_report(&report),
    }

    Ok(())
}

fn print_trend_report(report: &TrendReport) {
    let sections = [
        ("rising", &report.rising),
        ("declining", &report.declining),
        ("stable", &report.stable),
    ];
    for (label, items) in sections {
        println!("{label}:");
        if items.is_empty() {
            println!("  (none)");
            continue;
        }
        for item in items.iter() {
            println!(
                "  {:<24} [{}] velocity {:+.2}, latest count {}",
                item.value, item.dimension, item.velocity, item.latest_count
            );
        }
    }
    println!("{}", report.narrative);
}

/// Print the ranked radar of tracked sounds and hashtags.
///
/// # Errors
///
/// Returns an error if radar snapshots cannot be loaded.
pub(crate) async fn run_radar(
    pool: &sqlx::PgPool,
    config: &vantage_core::AppConfig,
    account_set: &str,
    limit: Option<usize>,
    hours: Option<i64>,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(DEFAULT_RADAR_LIMIT);
    let hours = hours.unwrap_or(config.detection.radar_lookback_hours);
    let now = Utc::now();
    let since = now - Duration::hours(hours);

    let snapshots = vantage_db::list_radar_snapshots(pool, account_set, since).await?;
    let ranked = rank_trends(&snapshots, now, limit);

    if ranked.is_empty() {
        println!("no tracked items in the last {hours} hours");
        return Ok(());
    }

    for trend in &ranked {
        println!(
            "#{:<3} {:<8} {:<24} score {:5.1}  {:<9} ({}) velocity {:+.2}, usage {}",
            trend.rank,
            trend.kind,
            trend.item_id,
            trend.composite,
            trend.phase,
            trend.signal,
            trend.velocity,
            trend.latest_usage
        );
    }

    Ok(())
}

/// Print the own-vs-competitor content gap report.
///
/// # Errors
///
/// Returns an error if posts cannot be loaded.
pub(crate) async fn run_gaps(
    pool: &sqlx::PgPool,
    config: &vantage_core::AppConfig,
    account_set: &str,
    refresh: bool,
) -> anyhow::Result<()> {
    let now = Utc::now();

    let own: Vec<Post> = vantage_db::list_own_posts(pool, account_set)
        .await?
        .into_iter()
        .map(PostRow::into_post)
        .collect();

    let competitors: Vec<Post> = vantage_db::list_flagged_posts(pool, account_set)
        .await?
        .into_iter()
        .map(PostRow::into_post)
        .filter(|p| p.relationship == Relationship::Competitor)
        .collect();

    let mut analyzer = GapAnalyzer::new(config.detection.gap_cache_ttl_hours);
    let analysis = analyzer.analyze(&own, &competitors, now, refresh);

    if !analysis.has_data {
        println!("no data: need at least one own post and one competitor outlier");
        return Ok(());
    }

    println!(
        "comparing {} own posts against {} competitor outliers",
        analysis.own_post_count, analysis.competitor_outlier_count
    );

    print_gap_section("missing hooks", &analysis.missing_hooks);
    print_gap_section("missing formats", &analysis.missing_formats);
    print_gap_section("missing patterns", &analysis.missing_patterns);
    print_gap_section("missing triggers", &analysis.missing_triggers);

    println!("own strengths:");
    if analysis.own_strengths.is_empty() {
        println!("  (none)");
    }
    for strength in &analysis.own_strengths {
        println!(
            "  {:<24} [{}] used {} times, unused by competitors",
            strength.value, strength.dimension, strength.own_count
        );
    }

    Ok(())
}

fn print_gap_section(label: &str, entries: &[GapEntry]) {
    println!("{label}:");
    if entries.is_empty() {
        println!("  (none)");
        return;
    }
    for entry in entries {
        println!(
            "  {:<24} competitors use {} times, own channel never",
            entry.value, entry.competitor_count
        );
    }
}
