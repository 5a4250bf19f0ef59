//! docusign-sync - run the xavyo DocuSign connector from the command line
//!
//! - `sync` walks users, groups and permissions and prints the snapshot as JSON
//! - `create-account` provisions a DocuSign user
//! - `validate` checks that the configured credentials work
//!
//! Configuration comes from `DOCUSIGN_*` environment variables, optionally
//! loaded from a `.env` file.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use xavyo_connector_docusign::DocusignConnector;
use xavyo_connector_sdk::{AccountInfo, SyncContext, SyncRunner};

/// DocuSign connector runner
#[derive(Parser)]
#[command(name = "docusign-sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync every resource type and write the snapshot as JSON
    Sync {
        /// Write the snapshot here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Page budget per listing
        #[arg(long)]
        max_pages: Option<usize>,

        /// Items per page (defaults to DOCUSIGN_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Create a DocuSign user
    CreateAccount {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,
    },

    /// Check that the configured credentials can list users
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.log_format);

    let connector = DocusignConnector::from_env().context("invalid DocuSign configuration")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            on_signal.cancel();
        }
    });
    let ctx = SyncContext::new(cancel);

    match cli.command {
        Commands::Sync {
            output,
            max_pages,
            page_size,
        } => {
            let mut runner = SyncRunner::new(connector.resource_syncers())
                .with_page_size(page_size.unwrap_or(0));
            if let Some(max_pages) = max_pages {
                runner = runner.with_max_pages(max_pages);
            }

            let snapshot = match runner.run(&ctx).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    if e.is_transient() {
                        tracing::warn!(error = %e, "DocuSign is temporarily unavailable, rerun the sync later");
                    }
                    return Err(anyhow::Error::new(e).context("sync failed"));
                }
            };
            let rendered = serde_json::to_string_pretty(&snapshot)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "snapshot written");
                }
                None => println!("{rendered}"),
            }
        }
        Commands::CreateAccount { email, username } => {
            let mut profile = Map::new();
            profile.insert("email".into(), json!(email));
            profile.insert("username".into(), json!(username));

            let resource = connector
                .account_manager()
                .create_account(&ctx, &AccountInfo { profile })
                .await
                .context("account creation failed")?;
            println!("{}", serde_json::to_string_pretty(&resource)?);
        }
        Commands::Validate => {
            let annotations = connector
                .validate(&ctx)
                .await
                .context("credential validation failed")?;
            if let Some(rate_limit) = annotations.latest_rate_limit() {
                tracing::info!(
                    remaining = ?rate_limit.remaining,
                    limit = ?rate_limit.limit,
                    "rate limit"
                );
            }
            println!("ok");
        }
    }

    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,xavyo_connector_docusign=debug"));

    // Logs go to stderr so stdout stays clean for the snapshot.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
