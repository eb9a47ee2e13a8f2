// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use super::{record_parse, Mode};
use crate::ingest::normalize_text;
use crate::ingest::types::SourceProvider;
use crate::item::CandidateItem;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    author: Option<String>,
    #[serde(rename = "creator", alias = "dc:creator")]
    creator: Option<String>,
    category: Option<String>,
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), 0))
}

/// Generic RSS 2.0 feed (news sites, blogs).
pub struct RssProvider {
    name: String,
    mode: Mode,
}

impl RssProvider {
    pub fn from_fixture(name: impl Into<String>, s: &str) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(name: impl Into<String>, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    fn parse_items_from_str(s: &str) -> Result<Vec<CandidateItem>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let Some(link) = it.link.filter(|l| !l.trim().is_empty()) else {
                continue;
            };
            let mut item = CandidateItem::new(
                normalize_text(it.title.as_deref().unwrap_or_default()),
                link.trim(),
            )
            .with_body(normalize_text(it.description.as_deref().unwrap_or_default()));
            item.author = it
                .creator
                .or(it.author)
                .map(|a| normalize_text(&a))
                .filter(|a| !a.is_empty());
            item.published_at = it.pub_date.as_deref().and_then(parse_rfc2822);
            item.category_code = it.category.map(|c| c.trim().to_string());
            out.push(item);
        }

        record_parse(t0, out.len());
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>> {
        let body = self.mode.load(&self.name).await?;
        Self::parse_items_from_str(&body)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// XML only knows five named entities; feeds routinely ship HTML ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
