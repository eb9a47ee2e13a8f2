// src/ingest/sources.rs
//! `[sources]` config section and the provider factory used by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ingest::extract::ExtractConfig;
use crate::ingest::providers::{
    arxiv::{self, ArxivProvider},
    hn::{self, HackerNewsProvider},
    news_api::{self, NewsApiFlavor, NewsApiProvider},
    rss::RssProvider,
};
use crate::ingest::types::SourceProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HnSource {
    pub query: String,
    #[serde(default = "default_min_points")]
    pub min_points: u32,
    #[serde(default = "default_page")]
    pub hits_per_page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArxivSource {
    pub categories: Vec<String>,
    #[serde(default = "default_page")]
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RssSource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsApiSource {
    #[serde(default)]
    pub flavor: NewsApiFlavor,
    pub query: String,
    /// Name of the env var holding the API key (the key itself never lives in config).
    pub api_key_env: String,
    #[serde(default = "default_page")]
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub hn: Option<HnSource>,
    #[serde(default)]
    pub arxiv: Option<ArxivSource>,
    #[serde(default)]
    pub rss: Vec<RssSource>,
    #[serde(default)]
    pub news_api: Option<NewsApiSource>,
    #[serde(default)]
    pub extract: Option<ExtractConfig>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_min_points() -> u32 {
    20
}
fn default_page() -> u32 {
    30
}
fn default_timeout_secs() -> u64 {
    15
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            hn: None,
            arxiv: None,
            rss: Vec::new(),
            news_api: None,
            extract: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SourcesConfig {
    /// HN "artificial intelligence" stories with >20 points plus the main ArXiv AI lists.
    pub fn gazette_seed() -> Self {
        Self {
            hn: Some(HnSource {
                query: "artificial intelligence".into(),
                min_points: default_min_points(),
                hits_per_page: default_page(),
            }),
            arxiv: Some(ArxivSource {
                categories: vec!["cs.AI".into(), "cs.LG".into(), "cs.CL".into(), "cs.CV".into()],
                max_results: default_page(),
            }),
            rss: Vec::new(),
            news_api: None,
            extract: Some(ExtractConfig::default()),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Shared HTTP client with the per-request timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs.max(1)))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building http client")
    }

    /// Build HTTP providers in a fixed order: HN, ArXiv, RSS (config order), news API.
    /// A news API whose key env var is unset is skipped with a warning.
    pub fn build_providers(&self, client: &reqwest::Client) -> Result<Vec<Box<dyn SourceProvider>>> {
        let mut out: Vec<Box<dyn SourceProvider>> = Vec::new();

        if let Some(h) = &self.hn {
            let url = hn::search_url(&h.query, h.min_points, h.hits_per_page)?;
            out.push(Box::new(HackerNewsProvider::from_url(url, client.clone())));
        }
        if let Some(a) = &self.arxiv {
            let url = arxiv::query_url(&a.categories, a.max_results)?;
            out.push(Box::new(ArxivProvider::from_url(url, client.clone())));
        }
        for r in &self.rss {
            out.push(Box::new(RssProvider::from_url(
                r.name.clone(),
                r.url.clone(),
                client.clone(),
            )));
        }
        if let Some(n) = &self.news_api {
            match std::env::var(&n.api_key_env) {
                Ok(key) if !key.trim().is_empty() => {
                    let url = news_api::search_url(n.flavor, &n.query, key.trim(), n.page_size)?;
                    out.push(Box::new(NewsApiProvider::from_url(n.flavor, url, client.clone())));
                }
                _ => {
                    tracing::warn!(
                        target: "ingest",
                        env = %n.api_key_env,
                        "news api key not set, skipping provider"
                    );
                }
            }
        }
        Ok(out)
    }
}
