//! NewsAlert — binary entrypoint.
//! One-shot batch job: meant to be invoked hourly by an external
//! scheduler (cron, CI workflow). Exit 0 covers the "nothing to send"
//! case; non-zero means bad configuration or an unhandled error.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use newsalert::{run, Config, Overrides};

#[derive(Debug, Parser)]
#[command(name = "newsalert", about = "Fetch RSS headlines and deliver a digest to chat/email/SMS channels")]
struct Cli {
    /// Print the formatted message to stdout instead of dispatching.
    #[arg(long)]
    dry_run: bool,

    /// Category to send this run (overrides $CATEGORY, default "world").
    #[arg(long)]
    category: Option<String>,

    /// Path to a feeds TOML file (overrides $NEWSALERT_FEEDS_PATH).
    #[arg(long)]
    feeds: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("newsalert=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::resolve(Overrides {
        category: cli.category,
        feeds_path: cli.feeds,
        dry_run: cli.dry_run,
    })?;

    run(&config).await?;
    Ok(())
}
