// src/ingest/providers/hn.rs
//! Hacker News via the Algolia search API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use super::{record_parse, Mode};
use crate::ingest::types::SourceProvider;
use crate::item::CandidateItem;

pub const HN_SEARCH_ENDPOINT: &str = "https://hn.algolia.com/api/v1/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    title: Option<String>,
    url: Option<String>,
    author: Option<String>,
    points: Option<i64>,
    created_at_i: Option<i64>,
    story_text: Option<String>,
}

/// Story search URL, e.g. `query=artificial+intelligence&tags=story&numericFilters=points>20`.
pub fn search_url(query: &str, min_points: u32, hits_per_page: u32) -> Result<String> {
    let url = Url::parse_with_params(
        HN_SEARCH_ENDPOINT,
        &[
            ("query", query.to_string()),
            ("tags", "story".to_string()),
            ("numericFilters", format!("points>{min_points}")),
            ("hitsPerPage", hits_per_page.to_string()),
        ],
    )
    .context("building hn search url")?;
    Ok(url.into())
}

pub struct HackerNewsProvider {
    mode: Mode,
}

impl HackerNewsProvider {
    pub fn from_fixture(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    fn parse_items_from_str(s: &str) -> Result<Vec<CandidateItem>> {
        let t0 = std::time::Instant::now();
        let resp: SearchResponse = serde_json::from_str(s).context("parsing hn search json")?;

        let mut out = Vec::with_capacity(resp.hits.len());
        for hit in resp.hits {
            // Ask HN / Show HN text posts have no outbound URL; the gazette skips them.
            let Some(url) = hit.url.filter(|u| !u.trim().is_empty()) else {
                continue;
            };
            let mut item = CandidateItem::new(hit.title.unwrap_or_default(), url)
                .with_body(hit.story_text.unwrap_or_default());
            item.author = hit.author;
            item.community_score = hit.points;
            item.published_at = hit
                .created_at_i
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));
            out.push(item);
        }

        record_parse(t0, out.len());
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for HackerNewsProvider {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>> {
        let body = self.mode.load("HackerNews").await?;
        Self::parse_items_from_str(&body)
    }

    fn name(&self) -> &str {
        "HackerNews"
    }
}
