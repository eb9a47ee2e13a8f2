// src/assemble.rs
//! Final batch assembly: declared desk order, per-desk cap, empty desks omitted.
//! Also derives the renderer-facing bits (badge, truncated summary).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::item::CandidateItem;
use crate::rank::RankedItem;
use crate::relevance::ReasonCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyConfig {
    #[serde(default = "default_cap")]
    pub per_section_cap: usize,
    #[serde(default = "default_high_priority")]
    pub high_priority_score: u32,
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,
}

fn default_cap() -> usize {
    5
}
fn default_high_priority() -> u32 {
    4
}
fn default_summary_chars() -> usize {
    280
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            per_section_cap: default_cap(),
            high_priority_score: default_high_priority(),
            summary_chars: default_summary_chars(),
        }
    }
}

/// Display marker for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Trusted,
    HighPriority,
}

/// One item as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub item: CandidateItem,
    pub score: u32,
    pub reason: ReasonCode,
    pub badge: Option<Badge>,
    pub summary: String,
}

impl RankedEntry {
    fn from_ranked(r: RankedItem, cfg: &AssemblyConfig) -> Self {
        let badge = if r.reason == ReasonCode::TrustedSource {
            Some(Badge::Trusted)
        } else if r.score >= cfg.high_priority_score {
            Some(Badge::HighPriority)
        } else {
            None
        };
        let summary = summarize(&r.item.body_text, cfg.summary_chars);
        Self {
            item: r.item,
            score: r.score,
            reason: r.reason,
            badge,
            summary,
        }
    }

    /// Author if known, else the source domain.
    pub fn byline(&self) -> &str {
        self.item
            .author
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(self.item.source_domain.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionBucket {
    pub name: String,
    pub items: Vec<RankedEntry>,
}

/// Ordered desks, each non-empty and capped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankedBatch {
    pub sections: Vec<SectionBucket>,
}

impl RankedBatch {
    pub fn get(&self, name: &str) -> Option<&SectionBucket> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn total_items(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// Cut `text` to at most `max` chars on a word boundary, appending `…` when cut.
pub fn summarize(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end())
}

/// Build the final batch from categorized desks.
pub fn assemble(
    mut sections: HashMap<String, Vec<RankedItem>>,
    declared_order: &[String],
    cfg: &AssemblyConfig,
) -> RankedBatch {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in declared_order {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let Some(items) = sections.remove(name) else {
            continue;
        };
        let items: Vec<RankedEntry> = items
            .into_iter()
            .take(cfg.per_section_cap)
            .map(|r| RankedEntry::from_ranked(r, cfg))
            .collect();
        if items.is_empty() {
            continue;
        }
        out.push(SectionBucket {
            name: name.clone(),
            items,
        });
    }
    RankedBatch { sections: out }
}
