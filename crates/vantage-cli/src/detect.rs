//! Detection command handler for the CLI.
//!
//! Called from `main` after the database pool and config are established.
//! Insufficient-data accounts are logged and skipped rather than
//! propagated so one sparse account does not abort the full run.

use chrono::{Duration, Utc};
use vantage_core::Post;
use vantage_db::PostRow;
use vantage_detect::{detect_outliers, DetectionReport};

/// How many top outliers the run summary prints.
const SUMMARY_ROWS: usize = 5;

/// Run a full outlier recompute for one account set: load the windowed
/// posts, detect, reset all flags, and re-apply them to the detected set.
///
/// When `dry_run` is `true` the function prints what would be flagged and
/// returns without touching the database.
///
/// # Errors
///
/// Returns an error if the post window cannot be loaded or flags cannot be
/// written back. Detection itself never fails on sparse data.
pub(crate) async fn run_detect(
    pool: &sqlx::PgPool,
    config: &vantage_core::AppConfig,
    account_set: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let since = Utc::now() - Duration::days(config.detection.lookback_days);
    let rows = vantage_db::list_posts_for_window(pool, account_set, since).await?;
    let posts: Vec<Post> = rows.into_iter().map(PostRow::into_post).collect();

    let report = detect_outliers(&posts, &config.detection);

    for handle in &report.skipped_accounts {
        tracing::info!(
            account = %handle,
            "skipping account — not enough posts for a baseline"
        );
    }

    if dry_run {
        println!(
            "dry-run: would flag {} outliers across {} accounts ({} skipped)",
            report.outliers.len(),
            report.baselines.len(),
            report.skipped_accounts.len()
        );
        return Ok(());
    }

    let run = vantage_db::create_detection_run(pool, account_set, "detect", "cli").await?;
    vantage_db::start_detection_run(pool, run.id).await?;

    match apply_report(pool, account_set, &report).await {
        Ok(()) => {
            let flagged = i32::try_from(report.outliers.len()).unwrap_or(i32::MAX);
            vantage_db::complete_detection_run(pool, run.id, flagged).await?;
        }
        Err(e) => {
            vantage_db::fail_detection_run(pool, run.id, &e.to_string()).await?;
            return Err(e.into());
        }
    }

    print_summary(account_set, &report);
    Ok(())
}

/// Reset the set's outlier flags, then apply the freshly detected set.
async fn apply_report(
    pool: &sqlx::PgPool,
    account_set: &str,
    report: &DetectionReport,
) -> Result<(), vantage_db::DbError> {
    let cleared = vantage_db::reset_outlier_flags(pool, account_set).await?;
    tracing::debug!(cleared, "cleared previous outlier flags");

    for outlier in &report.outliers {
        vantage_db::mark_outlier(pool, outlier.post_id, outlier.score, &outlier.content_tags)
            .await?;
    }

    Ok(())
}

fn print_summary(account_set: &str, report: &DetectionReport) {
    println!(
        "flagged {} outliers across {} accounts in '{account_set}' ({} skipped)",
        report.outliers.len(),
        report.baselines.len(),
        report.skipped_accounts.len()
    );

    for (i, outlier) in report.outliers.iter().take(SUMMARY_ROWS).enumerate() {
        println!(
            "  #{:<2} @{:<20} {:.1}x baseline, {:.1} sd, score {:.2}, driven by {}",
            i + 1,
            outlier.account_handle,
            outlier.multiplier,
            outlier.sigma,
            outlier.score,
            outlier.driver
        );
    }
}
