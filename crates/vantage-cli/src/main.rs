mod accounts;
mod detect;
mod trends;


use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "vantage-cli")]
#[command(about = "Engagement outlier and trend intelligence CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database utilities.
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Tracked-account management.
    Accounts {
        #[command(subcommand)]
        command: AccountCommands,
    },
    /// Run a full outlier detection pass for an account set.
    Detect {
        #[arg(long = "set")]
        account_set: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Capture today's trend snapshot and this hour's radar snapshots.
    Capture {
        #[arg(long = "set")]
        account_set: String,
    },
    /// Rising/declining/stable report over recent daily snapshots.
    Trends {
        #[arg(long = "set")]
        account_set: String,
        #[arg(long)]
        weeks: Option<i64>,
    },
    /// Ranked radar of tracked sounds and hashtags.
    Radar {
        #[arg(long = "set")]
        account_set: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        hours: Option<i64>,
    },
    /// Own-vs-competitor content gap report.
    Gaps {
        #[arg(long = "set")]
        account_set: String,
        #[arg(long)]
        refresh: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[derive(Debug, Subcommand)]
enum AccountCommands {
    /// List the set's accounts.
    List {
        #[arg(long = "set")]
        account_set: String,
    },
    /// Deactivate an account and archive its posts.
    Disable {
        #[arg(long = "set")]
        account_set: String,
        handle: String,
    },
    /// Reactivate an account and restore its archived posts.
    Enable {
        #[arg(long = "set")]
        account_set: String,
        handle: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("vantage-cli: pass a subcommand (try --help)");
        return Ok(());
    };

    let config = vantage_core::load_app_config()?;
    init_tracing(&config.log_level);

    let pool = vantage_db::connect_pool(
        &config.database_url,
        vantage_db::PoolConfig {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        },
    )
    .await?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            vantage_db::health_check(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = vantage_db::run_migrations(&pool).await?;
            println!("applied {applied} migrations");
        }
        Commands::Accounts { command } => match command {
            AccountCommands::List { account_set } => {
                accounts::run_list(&pool, &account_set).await?;
            }
            AccountCommands::Disable {
                account_set,
                handle,
            } => {
                accounts::run_disable(&pool, &account_set, &handle).await?;
            }
            AccountCommands::Enable {
                account_set,
                handle,
            } => {
                accounts::run_enable(&pool, &account_set, &handle).await?;
            }
        },
        Commands::Detect {
            account_set,
            dry_run,
        } => {
            detect::run_detect(&pool, &config, &account_set, dry_run).await?;
        }
        Commands::Capture { account_set } => {
            trends::run_capture(&pool, &config, &account_set).await?;
        }
        Commands::Trends { account_set, weeks } => {
            trends::run_trends(&pool, &config, &account_set, weeks).await?;
        }
        Commands::Radar {
            account_set,
            limit,
            hours,
        } => {
            trends::run_radar(&pool, &config, &account_set, limit, hours).await?;
        }
        Commands::Gaps {
            account_set,
            refresh,
        } => {
            trends::run_gaps(&pool, &config, &account_set, refresh).await?;
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
