// src/item.rs
//! Candidate items: the common shape every fetch adapter normalizes into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// One fetched piece of content awaiting a relevance decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub title: String,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub source_domain: String,
    pub source_url: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub community_score: Option<i64>,
    #[serde(default)]
    pub category_code: Option<String>,
}

impl CandidateItem {
    /// Build an item from title + URL; the domain is derived from the URL.
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        let source_url = source_url.into();
        let source_domain = domain_from_url(&source_url).unwrap_or_default();
        Self {
            title: title.into(),
            body_text: String::new(),
            source_domain,
            source_url,
            author: None,
            published_at: None,
            community_score: None,
            category_code: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body_text = body.into();
        self
    }

    /// Override the derived domain (e.g. a news API that reports its own source label).
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.source_domain = domain.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    pub fn with_community_score(mut self, score: i64) -> Self {
        self.community_score = Some(score);
        self
    }

    pub fn with_category(mut self, code: impl Into<String>) -> Self {
        self.category_code = Some(code.into());
        self
    }

    /// Title and URL must both be present (non-blank).
    pub fn is_eligible(&self) -> bool {
        !self.title.trim().is_empty() && !self.source_url.trim().is_empty()
    }

    /// Whitespace-separated word count of the body.
    pub fn word_count(&self) -> usize {
        self.body_text.split_whitespace().count()
    }

    /// Short, stable id derived from the URL. Safe to log.
    pub fn item_id(&self) -> String {
        short_hash(&self.source_url)
    }
}

/// Hex of the first 6 bytes of SHA-256(text).
pub(crate) fn short_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Lowercased host of `url` without a leading `www.`.
pub fn domain_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Split a raw batch into eligible items (input order kept) and a malformed count.
pub fn partition_eligible(items: Vec<CandidateItem>) -> (Vec<CandidateItem>, usize) {
    let total = items.len();
    let eligible: Vec<CandidateItem> = items.into_iter().filter(|it| it.is_eligible()).collect();
    let malformed = total - eligible.len();
    (eligible, malformed)
}
