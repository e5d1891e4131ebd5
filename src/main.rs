use anyhow::Context;
use asr_rag::commands::{record, search, seed, show_status, transcribe};
use asr_rag::config::{Config, get_config_dir, show_config};
use asr_rag::transport::block_on_cancellable;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;

#[derive(Parser)]
#[command(name = "asr-rag")]
#[command(about = "Correct jargon in speech-to-text output using a glossary vector index")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml and the corpus file
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed the corpus and upsert it into the glossary collection
    Seed,
    /// Search the glossary for terms similar to a phrase
    Search {
        /// Phrase to search for
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Transcribe a WAV file and correct its jargon
    Transcribe {
        /// WAV file (mono, 16-bit PCM, 16 kHz)
        file: PathBuf,
    },
    /// Record from the microphone, transcribe, and correct
    Record {
        /// Recording length in seconds
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        seconds: Option<u32>,
    },
    /// Show the state of the glossary collection
    Status,
    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Search { .. } => "search",
            Self::Transcribe { .. } => "transcribe",
            Self::Record { .. } => "record",
            Self::Status => "status",
            Self::Config { .. } => "config",
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let name = cli.command.name();

    match block_on_cancellable(run(cli), ctrl_c()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", name, e);
            ExitCode::FAILURE
        }
    }
}

/// Resolves on the first Ctrl-C; never resolves if the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => get_config_dir().context("config")?,
    };
    let config = Config::load(&config_dir).context("config")?;

    execute(&config, cli.command).await
}

async fn execute(config: &Config, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Seed => seed(config).await,
        Commands::Search { query } => search(config, &query.join(" ")).await,
        Commands::Transcribe { file } => transcribe(config, &file).await,
        Commands::Record { seconds } => record(config, seconds).await,
        Commands::Status => show_status(config).await,
        Commands::Config { show } => {
            if show {
                show_config(config);
            } else {
                println!("{}", config.config_file_path().display());
            }
            Ok(())
        }
    }
}
