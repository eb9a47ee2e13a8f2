// src/ingest/providers/arxiv.rs
//! ArXiv API (Atom feed). Each entry carries its primary category, which the
//! section router maps onto desks.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use url::Url;

use super::{record_parse, Mode};
use crate::ingest::normalize_text;
use crate::ingest::types::SourceProvider;
use crate::item::CandidateItem;

pub const ARXIV_QUERY_ENDPOINT: &str = "https://export.arxiv.org/api/query";

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    published: Option<String>,
    #[serde(rename = "author", default)]
    author: Vec<Author>,
    #[serde(rename = "link", default)]
    link: Vec<Link>,
    #[serde(rename = "primary_category", alias = "arxiv:primary_category", default)]
    primary_category: Option<Category>,
    #[serde(rename = "category", default)]
    category: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
    #[serde(rename = "@type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(rename = "@term")]
    term: String,
}

/// Newest submissions across `categories`, e.g. `cat:cs.AI OR cat:cs.LG`.
pub fn query_url(categories: &[String], max_results: u32) -> Result<String> {
    let search = categories
        .iter()
        .map(|c| format!("cat:{}", c.trim()))
        .collect::<Vec<_>>()
        .join(" OR ");
    let url = Url::parse_with_params(
        ARXIV_QUERY_ENDPOINT,
        &[
            ("search_query", search),
            ("sortBy", "submittedDate".to_string()),
            ("sortOrder", "descending".to_string()),
            ("max_results", max_results.to_string()),
        ],
    )
    .context("building arxiv query url")?;
    Ok(url.into())
}

fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl Entry {
    /// The HTML abstract page; falls back to the entry id (also an abs URL).
    fn page_url(&self) -> Option<String> {
        self.link
            .iter()
            .find(|l| {
                l.rel.as_deref().unwrap_or("alternate") == "alternate"
                    && l.kind.as_deref().unwrap_or("text/html") == "text/html"
            })
            .map(|l| l.href.clone())
            .or_else(|| self.id.clone())
    }

    fn category_code(&self) -> Option<String> {
        self.primary_category
            .as_ref()
            .or_else(|| self.category.first())
            .map(|c| c.term.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

pub struct ArxivProvider {
    mode: Mode,
}

impl ArxivProvider {
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
        let feed: Feed = from_str(s).context("parsing arxiv atom xml")?;

        let mut out = Vec::with_capacity(feed.entry.len());
        for e in feed.entry {
            let Some(url) = e.page_url() else {
                continue;
            };
            let authors: Vec<String> = e
                .author
                .iter()
                .filter_map(|a| a.name.as_deref().map(normalize_text))
                .filter(|n| !n.is_empty())
                .collect();

            let mut item = CandidateItem::new(
                normalize_text(e.title.as_deref().unwrap_or_default()),
                url,
            )
            .with_body(normalize_text(e.summary.as_deref().unwrap_or_default()));
            if !authors.is_empty() {
                item.author = Some(authors.join(", "));
            }
            item.published_at = e.published.as_deref().and_then(parse_rfc3339);
            item.category_code = e.category_code();
            out.push(item);
        }

        record_parse(t0, out.len());
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for ArxivProvider {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>> {
        let body = self.mode.load("ArXiv").await?;
        Self::parse_items_from_str(&body)
    }

    fn name(&self) -> &str {
        "ArXiv"
    }
}
