// src/ingest/providers/news_api.rs
//! NewsAPI.org and GNews. Both return `articles[]` with nearly the same shape;
//! GNews has no `author` and reports `source.url` instead of `source.id`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{record_parse, Mode};
use crate::ingest::normalize_text;
use crate::ingest::types::SourceProvider;
use crate::item::CandidateItem;

pub const NEWSAPI_ENDPOINT: &str = "https://newsapi.org/v2/everything";
pub const GNEWS_ENDPOINT: &str = "https://gnews.io/api/v4/search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsApiFlavor {
    #[default]
    NewsApi,
    GNews,
}

impl NewsApiFlavor {
    fn label(self) -> &'static str {
        match self {
            NewsApiFlavor::NewsApi => "NewsAPI",
            NewsApiFlavor::GNews => "GNews",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    author: Option<String>,
    source: Option<ArticleSource>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

// NewsAPI truncates `content` and appends e.g. "… [+2345 chars]".
static RE_TRUNC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(…|\.\.\.)?\s*\[\+\d+ chars\]\s*$").expect("truncation regex"));

/// Search URL for the given flavor. The key goes in the query string for both APIs.
pub fn search_url(flavor: NewsApiFlavor, query: &str, api_key: &str, page_size: u32) -> Result<String> {
    let url = match flavor {
        NewsApiFlavor::NewsApi => Url::parse_with_params(
            NEWSAPI_ENDPOINT,
            &[
                ("q", query.to_string()),
                ("language", "en".to_string()),
                ("sortBy", "publishedAt".to_string()),
                ("pageSize", page_size.to_string()),
                ("apiKey", api_key.to_string()),
            ],
        ),
        NewsApiFlavor::GNews => Url::parse_with_params(
            GNEWS_ENDPOINT,
            &[
                ("q", query.to_string()),
                ("lang", "en".to_string()),
                ("max", page_size.to_string()),
                ("apikey", api_key.to_string()),
            ],
        ),
    }
    .context("building news api url")?;
    Ok(url.into())
}

pub struct NewsApiProvider {
    flavor: NewsApiFlavor,
    mode: Mode,
}

impl NewsApiProvider {
    pub fn from_fixture(flavor: NewsApiFlavor, s: &str) -> Self {
        Self {
            flavor,
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(flavor: NewsApiFlavor, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            flavor,
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<CandidateItem>> {
        let t0 = std::time::Instant::now();
        let resp: Response = serde_json::from_str(s)
            .with_context(|| format!("parsing {} json", self.flavor.label()))?;

        let mut out = Vec::with_capacity(resp.articles.len());
        for a in resp.articles {
            let Some(url) = a.url.filter(|u| !u.trim().is_empty()) else {
                continue;
            };
            let description = normalize_text(a.description.as_deref().unwrap_or_default());
            let content = normalize_text(a.content.as_deref().unwrap_or_default());
            let content = RE_TRUNC.replace(&content, "").to_string();
            let body = if content.is_empty() || description.contains(&content) {
                description
            } else if description.is_empty() || content.contains(&description) {
                content
            } else {
                format!("{description} {content}")
            };

            let source_name = a.source.and_then(|s| s.name).filter(|n| !n.trim().is_empty());
            let mut item = CandidateItem::new(
                normalize_text(a.title.as_deref().unwrap_or_default()),
                url.trim(),
            )
            .with_body(body);
            item.author = a
                .author
                .filter(|n| !n.trim().is_empty())
                .or(source_name);
            item.published_at = a
                .published_at
                .as_deref()
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|dt| dt.with_timezone(&Utc));
            out.push(item);
        }

        record_parse(t0, out.len());
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for NewsApiProvider {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>> {
        let body = self.mode.load(self.flavor.label()).await?;
        self.parse_items_from_str(&body)
    }

    fn name(&self) -> &str {
        self.flavor.label()
    }
}
