//! Account management command handlers for the CLI.

/// List the set's accounts, own channel first.
///
/// # Errors
///
/// Returns an error on database query failure.
pub(crate) async fn run_list(pool: &sqlx::PgPool, account_set: &str) -> anyhow::Result<()> {
    let accounts = vantage_db::list_active_accounts(pool, account_set).await?;

    if accounts.is_empty() {
        println!("no active accounts in set '{account_set}'");
        return Ok(());
    }

    for account in &accounts {
        println!(
            "@{:<20} {:<10} {:<10} {}",
            account.handle,
            account.platform,
            account.relationship,
            account.display_name.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

/// Deactivate an account and archive its posts.
///
/// # Errors
///
/// Returns an error if the handle is unknown in the set or the update fails.
pub(crate) async fn run_disable(
    pool: &sqlx::PgPool,
    account_set: &str,
    handle: &str,
) -> anyhow::Result<()> {
    vantage_db::get_account_by_handle(pool, account_set, handle)
        .await?
        .ok_or_else(|| anyhow::anyhow!("account '{handle}' not found in set '{account_set}'"))?;

    let archived = vantage_db::deactivate_account(pool, account_set, handle).await?;
    println!("disabled @{handle}; archived {archived} posts");
    Ok(())
}

/// Reactivate an account and restore its archived posts.
///
/// # Errors
///
/// Returns an error if the handle is unknown in the set or the update fails.
pub(crate) async fn run_enable(
    pool: &sqlx::PgPool,
    account_set: &str,
    handle: &str,
) -> anyhow::Result<()> {
    vantage_db::get_account_by_handle(pool, account_set, handle)
        .await?
        .ok_or_else(|| anyhow::anyhow!("account '{handle}' not found in set '{account_set}'"))?;

    let restored = vantage_db::reactivate_account(pool, account_set, handle).await?;
    println!("enabled @{handle}; restored {restored} posts");
    Ok(())
}
