// src/sections.rs
//! Desk routing: partition the globally ranked list by category code.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::rank::RankedItem;

pub const DEFAULT_SECTION: &str = "General";

/// Category → desk mapping plus the desk order the renderer expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    #[serde(default)]
    pub category_map: HashMap<String, String>,
    #[serde(default = "default_section")]
    pub default_section: String,
    #[serde(default)]
    pub order: Vec<String>,
}

fn default_section() -> String {
    DEFAULT_SECTION.to_string()
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            category_map: HashMap::new(),
            default_section: default_section(),
            order: vec![default_section()],
        }
    }
}

impl SectionConfig {
    /// ArXiv desks used by the gazette.
    pub fn arxiv_desks() -> Self {
        let mut category_map = HashMap::new();
        for (code, desk) in [
            ("cs.AI", "Artificial Intelligence"),
            ("cs.LG", "Machine Learning"),
            ("stat.ML", "Machine Learning"),
            ("cs.CL", "Language"),
            ("cs.CV", "Vision"),
            ("cs.RO", "Robotics"),
        ] {
            category_map.insert(code.to_string(), desk.to_string());
        }
        Self {
            category_map,
            default_section: "Industry".into(),
            order: [
                "Industry",
                "Artificial Intelligence",
                "Machine Learning",
                "Language",
                "Vision",
                "Robotics",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Resolve a category code: exact, then case-insensitive, then the default desk.
    pub fn section_for(&self, code: Option<&str>) -> &str {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return &self.default_section;
        };
        if let Some(s) = self.category_map.get(code) {
            return s;
        }
        // Deterministic pick if two keys differ only by case.
        self.category_map
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(code))
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(_, v)| v.as_str())
            .unwrap_or(self.default_section.as_str())
    }
}

/// Route ranked items into desks. Each desk keeps the inherited global order.
pub fn categorize(
    ranked: Vec<RankedItem>,
    category_map: &HashMap<String, String>,
    default_section: &str,
) -> HashMap<String, Vec<RankedItem>> {
    let cfg = SectionConfig {
        category_map: category_map.clone(),
        default_section: default_section.to_string(),
        order: Vec::new(),
    };
    categorize_with(ranked, &cfg)
}

/// Same as [`categorize`], taking the whole section config.
pub fn categorize_with(
    ranked: Vec<RankedItem>,
    cfg: &SectionConfig,
) -> HashMap<String, Vec<RankedItem>> {
    let mut out: HashMap<String, Vec<RankedItem>> = HashMap::new();
    for r in ranked {
        let section = cfg.section_for(r.item.category_code.as_deref()).to_string();
        out.entry(section).or_default().push(r);
    }
    out
}
