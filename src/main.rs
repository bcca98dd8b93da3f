use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parlasent::config::Config;
use parlasent::dashboard::server::{self, DashboardQuery};
use parlasent::pipeline::build_corpus;
use parlasent::sentiment::vader::VaderScorer;
use parlasent::snapshot;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "parlasent",
    version,
    about = "Sentiment corpus of parliamentary speeches on AI and military technology"
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, global = true, default_value = "")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Select, score and join speeches, then write the CSV snapshot
    Build {
        /// Directory of `.txt` speeches with `-meta.tsv` companions
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output CSV path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Topic to search for (repeatable; replaces the configured list)
        #[arg(short, long = "topic")]
        topics: Vec<String>,
    },

    /// Print the dashboard datasets for a set of filters as JSON
    Report {
        /// Snapshot CSV to read
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Serve the dashboard API over HTTP
    Serve {
        /// Snapshot CSV to read
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Address to listen on
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Comma-separated parties to keep
    #[arg(long)]
    parties: Option<String>,

    /// Chamber to keep, or "Both"
    #[arg(long)]
    body: Option<String>,

    #[arg(long)]
    month_from: Option<u32>,

    #[arg(long)]
    month_to: Option<u32>,
}

impl From<FilterArgs> for DashboardQuery {
    fn from(args: FilterArgs) -> Self {
        Self {
            parties: args.parties,
            body: args.body,
            month_from: args.month_from,
            month_to: args.month_to,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // 1. Load config
    let mut config = Config::load(&cli.config)?;

    match cli.command {
        Command::Build {
            input,
            output,
            topics,
        } => {
            if let Some(input) = input {
                config.speeches_dir = input;
            }
            if let Some(output) = output {
                config.output_csv = output;
            }
            if !topics.is_empty() {
                config.topics = topics;
            }
            config.validate()?;

            info!("Building corpus for {} topics", config.topics.len());
            let scorer = VaderScorer::new();
            let (table, _) = build_corpus(
                &config.speeches_dir,
                config.topics.as_slice(),
                &scorer,
                config.reference_year,
            )
            .context("failed to build corpus")?;
            snapshot::save(&table, &config.output_csv)
                .with_context(|| format!("failed to save {}", config.output_csv.display()))?;
        }
        Command::Report { input, filters } => {
            let path = input.unwrap_or_else(|| config.output_csv.clone());
            let table = snapshot::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            let response = server::render(&table, &filters.into())?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Serve { input, bind } => {
            let path = input.unwrap_or_else(|| config.output_csv.clone());
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let table = snapshot::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            server::serve(table, &bind).await?;
        }
    }

    Ok(())
}
