// src/relevance.rs
//! Relevance gate: trusted-domain bypass, noise-phrase rejection and weighted
//! keyword scoring over a single candidate item.
//!
//! The check order is fixed: trust → noise → keyword score → threshold →
//! short-body guard → long-form fallback. Nothing here reads env or files;
//! configuration arrives as an immutable [`ClassifierConfig`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::item::CandidateItem;

/// Score reported for items accepted via a trusted domain.
pub const TRUSTED_SOURCE_SCORE: u32 = 1_000;

/// Why an item was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    TrustedSource,
    NoiseRejected,
    InsufficientSignal,
    AcceptedByScore,
}

impl ReasonCode {
    pub fn is_accepting(self) -> bool {
        matches!(self, ReasonCode::TrustedSource | ReasonCode::AcceptedByScore)
    }
}

/// Result of classifying one item.
///
/// `accepted` always agrees with `reason`; use the constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationVerdict {
    pub accepted: bool,
    pub score: u32,
    pub reason: ReasonCode,
    /// Keywords (or the noise phrase) that fired. Diagnostic only.
    pub matched: Vec<String>,
}

impl ClassificationVerdict {
    pub fn trusted() -> Self {
        Self::with_reason(ReasonCode::TrustedSource, TRUSTED_SOURCE_SCORE, Vec::new())
    }

    pub fn noise(phrase: &str) -> Self {
        Self::with_reason(ReasonCode::NoiseRejected, 0, vec![phrase.to_string()])
    }

    pub fn insufficient(score: u32, matched: Vec<String>) -> Self {
        Self::with_reason(ReasonCode::InsufficientSignal, score, matched)
    }

    pub fn by_score(score: u32, matched: Vec<String>) -> Self {
        Self::with_reason(ReasonCode::AcceptedByScore, score, matched)
    }

    fn with_reason(reason: ReasonCode, score: u32, matched: Vec<String>) -> Self {
        Self {
            accepted: reason.is_accepting(),
            score,
            reason,
            matched,
        }
    }
}

/* ----------------------------
Config schema (from TOML)
---------------------------- */

/// Which text fields a phrase list is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScope {
    #[default]
    Body,
    Title,
    TitleAndBody,
}

/// What happens to an item that scores below the threshold but is not short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BelowThresholdPolicy {
    /// Long-form content is tentatively treated as substantive.
    #[default]
    AcceptLongForm,
    /// Anything under the threshold is rejected as insufficient signal.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub trusted_domains: Vec<String>,
    #[serde(default)]
    pub noise_phrases: Vec<String>,
    #[serde(default)]
    pub signal_keywords: BTreeMap<String, u32>,
    pub accept_threshold: u32,
    #[serde(default)]
    pub min_body_length_if_no_keywords: usize,
    #[serde(default)]
    pub keyword_scope: MatchScope,
    #[serde(default = "default_noise_scope")]
    pub noise_scope: MatchScope,
    #[serde(default)]
    pub trusted_requires_on_topic: bool,
    #[serde(default)]
    pub on_topic_terms: Vec<String>,
    #[serde(default)]
    pub below_threshold: BelowThresholdPolicy,
    /// Short bodies must reach the threshold; by default only keyword-free
    /// short bodies are rejected.
    #[serde(default)]
    pub short_body_requires_threshold: bool,
}

fn default_noise_scope() -> MatchScope {
    MatchScope::TitleAndBody
}

impl ClassifierConfig {
    /// Load from a TOML string holding the classifier fields at top level.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let cfg: ClassifierConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg.normalized())
    }

    /// Reject configs the classifier would silently misbehave on.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some((k, _)) = self.signal_keywords.iter().find(|(_, w)| **w == 0) {
            anyhow::bail!("signal keyword `{}` has weight 0 (weights must be positive)", k);
        }
        if self.signal_keywords.keys().any(|k| k.trim().is_empty()) {
            anyhow::bail!("signal keyword list contains a blank entry");
        }
        if self.noise_phrases.iter().any(|p| p.trim().is_empty()) {
            anyhow::bail!("noise phrase list contains a blank entry");
        }
        if self.trusted_domains.iter().any(|d| d.trim().is_empty()) {
            anyhow::bail!("trusted domain list contains a blank entry");
        }
        Ok(())
    }

    /// Trim + lowercase every matching list and drop duplicates.
    pub fn normalized(mut self) -> Self {
        self.trusted_domains = clean_list(self.trusted_domains, |d| {
            let d = d.trim().trim_start_matches('.').to_ascii_lowercase();
            d.strip_prefix("www.").map(str::to_string).unwrap_or(d)
        });
        self.noise_phrases = clean_list(self.noise_phrases, |p| p.trim().to_lowercase());
        self.on_topic_terms = clean_list(self.on_topic_terms, |p| p.trim().to_lowercase());
        self.signal_keywords = self
            .signal_keywords
            .into_iter()
            .map(|(k, w)| (k.trim().to_lowercase(), w))
            .collect();
        self
    }

    /// The gazette gatekeeper: noise list, fifteen technical terms of weight 1,
    /// two terms to pass, and anything under 150 words that misses the
    /// threshold is fluff.
    pub fn gazette_seed() -> Self {
        let noise_phrases = [
            "excited to announce",
            "honored to join",
            "my new role",
            "looking for a new",
            "hiring for",
            "thanks for the opportunity",
            "personal news",
            "happy to share that i",
        ];
        let keywords = [
            "benchmarks",
            "transformer",
            "inference",
            "latency",
            "open-source",
            "parameters",
            "weights",
            "architecture",
            "token",
            "quantization",
            "fine-tune",
            "deployment",
            "api",
            "state-of-the-art",
            "sota",
        ];
        Self {
            trusted_domains: vec!["arxiv.org".into()],
            noise_phrases: noise_phrases.iter().map(|s| s.to_string()).collect(),
            signal_keywords: keywords.iter().map(|k| (k.to_string(), 1)).collect(),
            accept_threshold: 2,
            min_body_length_if_no_keywords: 150,
            keyword_scope: MatchScope::Body,
            noise_scope: MatchScope::Body,
            trusted_requires_on_topic: false,
            on_topic_terms: Vec::new(),
            below_threshold: BelowThresholdPolicy::AcceptLongForm,
            short_body_requires_threshold: true,
        }
    }

    /// Copy with a different threshold (used by widening).
    pub fn with_threshold(&self, threshold: u32) -> Self {
        let mut c = self.clone();
        c.accept_threshold = threshold;
        c
    }
}

fn clean_list(items: Vec<String>, f: impl Fn(&str) -> String) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let v = f(&it);
        if !v.is_empty() && !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/* ----------------------------
Matching helpers
---------------------------- */

/// True if `domain` equals a trusted entry or is a subdomain of one.
pub fn domain_is_trusted(domain: &str, trusted: &[String]) -> bool {
    let d = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    let d = d.strip_prefix("www.").unwrap_or(&d);
    if d.is_empty() {
        return false;
    }
    trusted.iter().any(|t| {
        let t = t.trim().to_ascii_lowercase();
        let t = t.strip_prefix("www.").unwrap_or(&t);
        if t.is_empty() {
            return false;
        }
        d == t
            || (d.len() > t.len()
                && d.ends_with(t)
                && d.as_bytes()[d.len() - t.len() - 1] == b'.')
    })
}

struct Haystack<'a> {
    title: &'a str,
    body: &'a str,
}

impl Haystack<'_> {
    fn contains(&self, needle: &str, scope: MatchScope) -> bool {
        match scope {
            MatchScope::Body => self.body.contains(needle),
            MatchScope::Title => self.title.contains(needle),
            MatchScope::TitleAndBody => self.title.contains(needle) || self.body.contains(needle),
        }
    }
}

fn trust_applies(item: &CandidateItem, title: &str, cfg: &ClassifierConfig) -> bool {
    if !domain_is_trusted(&item.source_domain, &cfg.trusted_domains) {
        return false;
    }
    if !cfg.trusted_requires_on_topic {
        return true;
    }
    if cfg.on_topic_terms.is_empty() {
        cfg.signal_keywords
            .keys()
            .any(|k| title.contains(&k.to_lowercase()))
    } else {
        cfg.on_topic_terms
            .iter()
            .any(|t| title.contains(&t.to_lowercase()))
    }
}

/* ----------------------------
Classifier
---------------------------- */

/// Classify one item. Pure and total: never panics, never errors.
pub fn classify(item: &CandidateItem, cfg: &ClassifierConfig) -> ClassificationVerdict {
    let title = item.title.to_lowercase();
    let body = item.body_text.to_lowercase();
    let hay = Haystack {
        title: &title,
        body: &body,
    };

    // 1) Trust overrides everything, noise included.
    if trust_applies(item, &title, cfg) {
        let v = ClassificationVerdict::trusted();
        log_verdict(item, &v, cfg);
        return v;
    }

    // 2) Noise phrases reject outright.
    if let Some(phrase) = cfg
        .noise_phrases
        .iter()
        .find(|p| hay.contains(&p.to_lowercase(), cfg.noise_scope))
    {
        let v = ClassificationVerdict::noise(phrase);
        log_verdict(item, &v, cfg);
        return v;
    }

    // 3) Keyword presence (each keyword counts once).
    let mut score = 0u32;
    let mut matched = Vec::new();
    for (kw, w) in &cfg.signal_keywords {
        if hay.contains(&kw.to_lowercase(), cfg.keyword_scope) {
            score = score.saturating_add(*w);
            matched.push(kw.clone());
        }
    }

    let short = item.word_count() < cfg.min_body_length_if_no_keywords;
    let v = if score >= cfg.accept_threshold {
        ClassificationVerdict::by_score(score, matched)
    } else if short && (score == 0 || cfg.short_body_requires_threshold) {
        ClassificationVerdict::insufficient(score, matched)
    } else {
        match cfg.below_threshold {
            BelowThresholdPolicy::AcceptLongForm => ClassificationVerdict::by_score(score, matched),
            BelowThresholdPolicy::Reject => ClassificationVerdict::insufficient(score, matched),
        }
    };
    log_verdict(item, &v, cfg);
    v
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

// Never log raw text. Only hashed id + short lists.
fn log_verdict(item: &CandidateItem, v: &ClassificationVerdict, cfg: &ClassifierConfig) {
    debug!(
        target: "relevance",
        id = %item.item_id(),
        domain = %item.source_domain,
        score = v.score,
        threshold = cfg.accept_threshold,
        reason = ?v.reason,
        matched = ?truncate_vec(&v.matched, 5),
        "classified"
    );
}

/* ----------------------------
Tests
---------------------------- */
