mod commands;

use anyhow::Result;
use arena_common::validate::DuplicateTagPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arena-cli")]
#[command(about = "Arena CLI - Check and judge problem definitions before publishing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a problem file offline (sanitize + structural validation)
    Check {
        /// Problem payload (JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Duplicate tag handling: deduplicate or reject
        #[arg(long, default_value = "deduplicate")]
        duplicate_tags: DuplicateTagPolicy,
    },

    /// Run the reference solutions of a problem file through the judge
    Validate {
        /// Problem payload (JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Judge0-compatible base URL
        #[arg(long, env = "JUDGE_URL", default_value = "http://localhost:2358")]
        judge_url: String,

        /// Sent as X-RapidAPI-Key
        #[arg(long, env = "JUDGE_API_KEY")]
        api_key: Option<String>,

        /// Sent as X-RapidAPI-Host
        #[arg(long, env = "JUDGE_API_HOST")]
        api_host: Option<String>,

        /// Language table overriding the Judge0 CE ids
        #[arg(short, long, env = "LANGUAGES_FILE")]
        languages: Option<PathBuf>,

        /// Give up waiting for the judge after this many seconds
        #[arg(long, default_value = "60")]
        deadline_secs: u64,

        /// Duplicate tag handling: deduplicate or reject
        #[arg(long, default_value = "deduplicate")]
        duplicate_tags: DuplicateTagPolicy,
    },

    /// List judge language ids
    Languages {
        /// Language table overriding the Judge0 CE ids
        #[arg(short, long, env = "LANGUAGES_FILE")]
        languages: Option<PathBuf>,
    },

    /// Write a problem template to start from
    Init {
        /// Output file
        #[arg(short, long, default_value = "problem.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            file,
            duplicate_tags,
        } => {
            commands::check_problem(&file, duplicate_tags)?;
        }
        Commands::Validate {
            file,
            judge_url,
            api_key,
            api_host,
            languages,
            deadline_secs,
            duplicate_tags,
        } => {
            commands::validate_problem(commands::ValidateOptions {
                file,
                judge_url,
                api_key,
                api_host,
                languages,
                deadline_secs,
                duplicate_tags,
            })
            .await?;
        }
        Commands::Languages { languages } => {
            commands::list_languages(languages.as_deref())?;
        }
        Commands::Init { path, force } => {
            commands::init_problem(&path, force)?;
        }
    }

    Ok(())
}
