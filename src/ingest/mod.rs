// src/ingest/mod.rs
//! Fetch adapters and the normalization/dedup pass that turns their output into
//! one deterministic batch for the pipeline.

pub mod extract;
pub mod providers;
pub mod sources;
pub mod types;

use crate::item::{domain_from_url, CandidateItem};
use crate::ingest::types::SourceProvider;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strsim::normalized_levenshtein;
use url::Url;

/// Body text cap after normalization (chars).
pub const MAX_BODY_CHARS: usize = 20_000;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Total items parsed from providers.");
        describe_counter!("ingest_kept_total", "Items kept after normalization + dedup.");
        describe_counter!("ingest_blank_total", "Items dropped for blank title/url.");
        describe_counter!("ingest_dedup_total", "Items removed as URL or title duplicates.");
        describe_counter!("ingest_provider_errors_total", "Provider fetch/parse errors.");
        describe_histogram!("ingest_parse_ms", "Provider parse time in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when ingest last ran.");
    });
}

/// Normalize text: decode entities, strip tags, fold quotes + whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap
    if out.chars().count() > MAX_BODY_CHARS {
        out = out.chars().take(MAX_BODY_CHARS).collect();
    }
    out
}

/// Dedup key for a URL: host without `www.`, path without trailing `/` or arXiv
/// version suffix, query kept, fragment and scheme dropped.
pub fn canonical_url(raw: &str) -> String {
    let Ok(u) = Url::parse(raw.trim()) else {
        return raw.trim().to_ascii_lowercase();
    };
    let host = domain_from_url(raw).unwrap_or_default();
    let mut path = u.path().trim_end_matches('/').to_string();
    if host == "arxiv.org" || host == "export.arxiv.org" {
        static RE_VER: OnceCell<regex::Regex> = OnceCell::new();
        let re = RE_VER.get_or_init(|| regex::Regex::new(r"v\d+$").expect("version regex"));
        path = re.replace(&path, "").to_string();
        path = path.replacen("/pdf/", "/abs/", 1);
        return format!("arxiv.org{path}");
    }
    match u.query() {
        Some(q) => format!("{host}{path}?{q}"),
        None => format!("{host}{path}"),
    }
}

fn title_key(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Titles at or above this normalized Levenshtein similarity are duplicates.
    #[serde(default = "default_title_similarity")]
    pub title_similarity: f64,
}

fn default_title_similarity() -> f64 {
    0.92
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            title_similarity: default_title_similarity(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub fetched: usize,
    pub provider_errors: usize,
    pub blank: usize,
    pub duplicates: usize,
    pub kept: usize,
}

/// Normalize title/body, drop blank items, drop URL and near-title duplicates.
/// The first occurrence wins, so input order decides which copy survives.
/// Returns (kept, blank_count, duplicate_count).
pub fn normalize_filter_dedup(
    raw: Vec<CandidateItem>,
    cfg: &DedupConfig,
) -> (Vec<CandidateItem>, usize, usize) {
    let mut blank = 0usize;
    let mut normalized = Vec::with_capacity(raw.len());
    for mut it in raw {
        it.title = normalize_text(&it.title);
        it.body_text = normalize_text(&it.body_text);
        it.source_url = it.source_url.trim().to_string();
        if it.source_domain.trim().is_empty() {
            it.source_domain = domain_from_url(&it.source_url).unwrap_or_default();
        }
        if !it.is_eligible() {
            blank += 1;
            continue;
        }
        normalized.push(it);
    }

    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_titles: Vec<String> = Vec::new();
    let mut keep = Vec::with_capacity(normalized.len());
    let mut dups = 0usize;
    for it in normalized {
        let url_key = canonical_url(&it.source_url);
        let tkey = title_key(&it.title);
        let near_dup = seen_titles
            .iter()
            .any(|t| normalized_levenshtein(t, &tkey) >= cfg.title_similarity);
        if seen_urls.contains(&url_key) || near_dup {
            dups += 1;
            continue;
        }
        seen_urls.insert(url_key);
        seen_titles.push(tkey);
        keep.push(it);
    }
    (keep, blank, dups)
}

/// Run every provider once (sequentially, in slice order) and normalize the result.
/// Provider failures are logged + counted and never abort the batch.
pub async fn run_once(
    providers: &[Box<dyn SourceProvider>],
    dedup: &DedupConfig,
) -> (Vec<CandidateItem>, IngestStats) {
    ensure_metrics_described();

    let mut stats = IngestStats::default();
    let mut raw = Vec::new();
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => {
                tracing::debug!(target: "ingest", provider = p.name(), count = v.len(), "provider ok");
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = p.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
                stats.provider_errors += 1;
            }
        }
    }
    stats.fetched = raw.len();

    let (kept, blank, dups) = normalize_filter_dedup(raw, dedup);
    stats.blank = blank;
    stats.duplicates = dups;
    stats.kept = kept.len();

    counter!("ingest_kept_total").increment(kept.len() as u64);
    counter!("ingest_blank_total").increment(blank as u64);
    counter!("ingest_dedup_total").increment(dups as u64);
    gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

    tracing::info!(
        target: "ingest",
        fetched = stats.fetched,
        kept = stats.kept,
        blank = stats.blank,
        duplicates = stats.duplicates,
        provider_errors = stats.provider_errors,
        "ingest finished"
    );
    (kept, stats)
}
