//! ruledeck: line-oriented front end for the rule engine.
//!
//! Reads one command per line from stdin and writes the outcome of each to
//! stdout:
//!
//! ```text
//! create rule: age > 30
//! evaluate rule: rule1: {"age": 35}
//! combine rules: rule1, rule2: AND
//! list rules
//! clear rules
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ruledeck::cache::RuleCache;
use ruledeck::config::Config;
use ruledeck::registry::{MemoryRegistry, Registry};
use ruledeck::{parse_command, RuleEngine};

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "ruledeck", version, about)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, env = "RULEDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Snapshot file to persist rules to. Overrides `store_path`.
    #[arg(long, env = "RULEDECK_STORE")]
    store: Option<PathBuf>,

    /// Number of decoded rule trees kept in memory. Overrides `cache_capacity`.
    #[arg(long, env = "RULEDECK_CACHE_CAPACITY")]
    cache_capacity: Option<usize>,

    /// Keep rules in memory only, even if a store path is configured.
    #[arg(long)]
    ephemeral: bool,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(store) = &self.store {
            config.store_path = Some(store.clone());
        }
        if let Some(capacity) = self.cache_capacity {
            config.cache_capacity = capacity;
        }
        if self.ephemeral {
            config.store_path = None;
        }
        Ok(config)
    }
}

// ── command loop ────────────────────────────────────────────────────

fn serve<R: Registry>(engine: &RuleEngine<R>) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = match parse_command(&line) {
            Ok(command) => match engine.dispatch(command) {
                Ok(outcome) => outcome.to_string(),
                Err(e) => {
                    warn!(error = %e, "command failed");
                    format!("Error: {e}")
                }
            },
            Err(e) => format!("Error: {e}"),
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let cache = RuleCache::new(config.cache_capacity);
    match &config.store_path {
        #[cfg(feature = "snapshot")]
        Some(path) => {
            let registry = ruledeck::registry::SnapshotRegistry::open(path)
                .with_context(|| format!("failed to open rule store {}", path.display()))?;
            info!(path = %path.display(), "serving with snapshot store");
            serve(&RuleEngine::with_cache(registry, cache))
        }
        #[cfg(not(feature = "snapshot"))]
        Some(path) => {
            anyhow::bail!(
                "store {} requested but ruledeck was built without the `snapshot` feature",
                path.display()
            )
        }
        None => {
            info!("serving with in-memory store");
            serve(&RuleEngine::with_cache(MemoryRegistry::new(), cache))
        }
    }
}
