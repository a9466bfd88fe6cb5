use anyhow::{Context, Result};
use atomizer_core::corpus::{repo, TacticMap};
use atomizer_core::{IngestConfig, IngestService};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Convert Atomic Red Team test records into executable abilities
#[derive(Parser)]
#[command(name = "atomizer")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone the corpus if needed and ingest every test record
    Ingest {
        /// Base directory holding the corpus checkout, data, and payloads
        #[arg(short = 'b', long = "base-dir", default_value = ".")]
        base_dir: PathBuf,

        /// JSON config file overriding the directory layout
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Corpus repository url (e.g. a fork)
        #[arg(long = "repo-url")]
        repo_url: Option<String>,

        /// ATT&CK bundle path; defaults to the one inside the corpus
        #[arg(long = "attack-json")]
        attack_json: Option<PathBuf>,

        /// Never clone; use the corpus checkout as-is
        #[arg(long = "skip-clone")]
        skip_clone: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing based on RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest {
            base_dir,
            config,
            repo_url,
            attack_json,
            skip_clone,
        } => ingest(base_dir, config, repo_url, attack_json, skip_clone),
    }
}

fn ingest(
    base_dir: PathBuf,
    config: Option<PathBuf>,
    repo_url: Option<String>,
    attack_json: Option<PathBuf>,
    skip_clone: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => IngestConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => IngestConfig::with_base(&base_dir),
    };

    if !skip_clone {
        repo::ensure_repo(&config.repo_dir, repo_url.as_deref())
            .context("failed to prepare the corpus checkout")?;
    }

    let bundle_path = attack_json.unwrap_or_else(|| config.attack_bundle_path());
    let tactics = TacticMap::from_attack_file(&bundle_path)
        .with_context(|| format!("failed to load taxonomy from {}", bundle_path.display()))?;

    let stats = IngestService::new(config, tactics).ingest_corpus()?;

    let errors = if stats.errors > 0 {
        format!(" and ran into {} errors", stats.errors)
    } else {
        String::new()
    };
    println!(
        "Ingested {} abilities (out of {}){errors}",
        stats.ingested, stats.total
    );
    Ok(())
}
