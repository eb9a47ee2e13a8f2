//! signal-desk binary entrypoint.
//! Fetches configured sources (or reads a JSON batch given as the first argument),
//! runs the relevance pipeline and prints the `RankedBatch` as pretty JSON.
//!
//! Usage:
//!   signal-desk                 # fetch from [sources]
//!   signal-desk items.json      # rank a stored Vec<CandidateItem>

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use signal_desk::ingest::{self, extract::ArticleFetcher};
use signal_desk::{CandidateItem, EngineConfig, Pipeline};

/// Logs go to stderr so stdout stays valid JSON.
/// `SIGNAL_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("signal_desk=info,warn"));
    let json = std::env::var("SIGNAL_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

async fn fetch_batch(cfg: &EngineConfig) -> Result<Vec<CandidateItem>> {
    let client = cfg.sources.http_client()?;
    let providers = cfg.sources.build_providers(&client)?;
    if providers.is_empty() {
        tracing::warn!("no sources configured; nothing to fetch");
    }
    let (items, _stats) = ingest::run_once(&providers, &cfg.dedup).await;

    match &cfg.sources.extract {
        Some(x) => Ok(ArticleFetcher::new(client, x.clone()).enrich(items).await),
        None => Ok(items),
    }
}

fn read_batch(path: &Path) -> Result<Vec<CandidateItem>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading batch from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing batch at {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev (SIGNAL_CONFIG_PATH, API keys); no-op otherwise.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = EngineConfig::load_default().context("loading engine config")?;

    let items = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => read_batch(&path)?,
        None => fetch_batch(&cfg).await?,
    };

    let out = Pipeline::new(cfg).run(items);
    let json = serde_json::to_string_pretty(&out.batch).context("serializing batch")?;
    println!("{json}");
    Ok(())
}
