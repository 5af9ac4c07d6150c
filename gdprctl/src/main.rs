use aggregator::{Aggregator, AggregatorError, Config, ConfigError, DeleteRequest, HttpTransport};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Operator CLI for GDPR data-subject requests: fetch, search, and delete
/// user data across all configured platforms.
#[derive(Parser)]
#[command(name = "gdprctl")]
struct Cli {
    /// Path to the platform configuration file (YAML)
    #[arg(long, global = true, default_value = "gdpr.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Best-effort fetch by username with email fallback
    FetchUser {
        #[arg(long)]
        id: String,
        #[arg(long)]
        email: String,
    },
    /// Search every platform by username, reporting per-platform status
    SearchUsername {
        #[arg(long)]
        username: String,
        /// Support ticket driving this request, recorded in the audit log
        #[arg(long)]
        ticket: String,
    },
    /// Search every platform by email, reporting per-platform status
    SearchEmail {
        #[arg(long)]
        email: String,
        /// Support ticket driving this request, recorded in the audit log
        #[arg(long)]
        ticket: String,
    },
    /// Delete users, one `uid:platform` pair per --request flag
    Delete {
        #[arg(long = "request", required = true, value_parser = parse_delete_request)]
        requests: Vec<DeleteRequest>,
    },
}

fn parse_delete_request(value: &str) -> Result<DeleteRequest, String> {
    let (uid, platform) = value
        .split_once(':')
        .ok_or_else(|| format!("expected uid:platform, got {value}"))?;
    if uid.is_empty() {
        return Err(format!("empty uid in {value}"));
    }

    Ok(DeleteRequest {
        uid: uid.to_string(),
        platform: platform.parse()?,
    })
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Aggregator(#[from] AggregatorError),
    #[error("could not serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::from_file(&cli.config)?;
    let transport = HttpTransport::new(&config);
    let aggregator = Aggregator::new(Arc::new(transport));

    let output = match cli.command {
        CliCommand::FetchUser { id, email } => {
            serde_json::to_value(aggregator.fetch_user(&id, &email).await?)?
        }
        CliCommand::SearchUsername { username, ticket } => {
            serde_json::to_value(aggregator.search_by_username(&username, &ticket).await)?
        }
        CliCommand::SearchEmail { email, ticket } => {
            serde_json::to_value(aggregator.search_by_email(&email, &ticket).await)?
        }
        CliCommand::Delete { requests } => {
            serde_json::to_value(aggregator.delete_users(requests).await)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
