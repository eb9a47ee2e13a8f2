// src/ingest/extract.rs
//! Optional article-body extraction: download each item's page and pull the
//! paragraph text, replacing thin feed bodies (HN hits usually have none).
//!
//! Downloads run concurrently but `buffered` yields results in input order,
//! so the batch handed to the pipeline stays deterministic.

use futures::stream::{self, StreamExt};
use metrics::counter;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ingest::normalize_text;
use crate::item::CandidateItem;

static ARTICLE_P: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article p").expect("static selector"));
static ANY_P: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("static selector"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Only replace the feed body when the page yields more words than this.
    #[serde(default = "default_min_words")]
    pub min_words: usize,
}

fn default_concurrency() -> usize {
    4
}
fn default_min_words() -> usize {
    40
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            min_words: default_min_words(),
        }
    }
}

/// Paragraph text of an HTML page. Prefers `<article>` paragraphs.
pub fn extract_paragraphs(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut paras: Vec<String> = doc
        .select(&ARTICLE_P)
        .map(|p| p.text().collect::<String>())
        .collect();
    if paras.is_empty() {
        paras = doc
            .select(&ANY_P)
            .map(|p| p.text().collect::<String>())
            .collect();
    }
    normalize_text(&paras.join("\n"))
}

pub struct ArticleFetcher {
    client: reqwest::Client,
    cfg: ExtractConfig,
}

impl ArticleFetcher {
    pub fn new(client: reqwest::Client, cfg: ExtractConfig) -> Self {
        Self { client, cfg }
    }

    /// Enrich every item's body. Items whose page cannot be downloaded are
    /// dropped; a page with too little text keeps the feed body.
    pub async fn enrich(&self, items: Vec<CandidateItem>) -> Vec<CandidateItem> {
        let total = items.len();
        let concurrency = self.cfg.concurrency.max(1);
        let out: Vec<CandidateItem> = stream::iter(items)
            .map(|item| self.enrich_one(item))
            .buffered(concurrency)
            .filter_map(|res| async move { res })
            .collect()
            .await;
        info!(
            target: "ingest",
            count = total,
            kept = out.len(),
            skipped = total - out.len(),
            "article extraction finished"
        );
        out
    }

    async fn enrich_one(&self, mut item: CandidateItem) -> Option<CandidateItem> {
        match self.fetch_body(&item.source_url).await {
            Ok(text) => {
                let words = text.split_whitespace().count();
                if words >= self.cfg.min_words && words > item.word_count() {
                    debug!(target: "ingest", id = %item.item_id(), words, "extracted article body");
                    item.body_text = text;
                }
                Some(item)
            }
            Err(e) => {
                warn!(target: "ingest", id = %item.item_id(), error = ?e, "article fetch failed, skipping item");
                counter!("ingest_extract_errors_total").increment(1);
                None
            }
        }
    }

    async fn fetch_body(&self, url: &str) -> anyhow::Result<String> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(extract_paragraphs(&html))
    }
}
