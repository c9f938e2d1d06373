use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use precache_keys::config::ResolverConfig;
use precache_keys::{PrecacheList, load_manifest, parse_base};

#[derive(Parser)]
#[command(
    name = "precache-keys",
    version,
    about = "Resolve precache manifest entries into cache keys and fetch URLs"
)]
struct Cli {
    /// Manifest JSON file (defaults to the configured manifest path)
    manifest: Option<PathBuf>,
    /// Configuration file (default: ./precache.config.json when present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Absolute base URL relative entries are resolved against
    #[arg(short, long, value_name = "URL")]
    base: Option<String>,
    /// Write resolved entries to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Log each resolved entry
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_dir = PathBuf::from(".");
    let config = match &cli.config {
        Some(path) => ResolverConfig::from_path(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => ResolverConfig::discover(&config_dir),
    };

    let base = match &cli.base {
        Some(base) => parse_base(base)?,
        None => config.base()?,
    };
    let manifest_path = cli
        .manifest
        .clone()
        .unwrap_or_else(|| config.manifest_file(&config_dir));
    let output_path = cli.output.clone().or_else(|| config.output_file(&config_dir));

    let entries = load_manifest(&manifest_path)?;
    let mut list = PrecacheList::new(base);
    list.extend(&entries)
        .with_context(|| format!("failed to resolve {}", manifest_path.display()))?;
    info!(
        entries = list.len(),
        base = %list.base(),
        "resolved precache manifest"
    );

    let json = list.to_json_pretty()?;
    match output_path {
        Some(path) => fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}
