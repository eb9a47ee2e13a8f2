// src/config.rs
//! Engine configuration: one TOML document, loaded once per run and passed
//! into the pipeline as an immutable value.
//!
//! Lookup order for `load_default()`:
//! 1) $SIGNAL_CONFIG_PATH
//! 2) config/signal.toml
//! 3) built-in `EngineConfig::default_seed()`
//!
//! `$SIGNAL_ACCEPT_THRESHOLD` overrides `[classifier].accept_threshold` when it parses.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::assemble::AssemblyConfig;
use crate::ingest::sources::SourcesConfig;
use crate::ingest::DedupConfig;
use crate::pipeline::WidenConfig;
use crate::relevance::ClassifierConfig;
use crate::sections::SectionConfig;

// --- env defaults & names ---
pub const DEFAULT_CONFIG_PATH: &str = "config/signal.toml";
pub const ENV_CONFIG_PATH: &str = "SIGNAL_CONFIG_PATH";
pub const ENV_ACCEPT_THRESHOLD: &str = "SIGNAL_ACCEPT_THRESHOLD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub sections: SectionConfig,
    #[serde(default)]
    pub assembly: AssemblyConfig,
    #[serde(default)]
    pub widen: Option<WidenConfig>,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

impl EngineConfig {
    /// Parse, validate and normalize a TOML document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let cfg: EngineConfig = toml::from_str(toml_str).context("parsing engine config")?;
        cfg.validate()?;
        Ok(cfg.normalized())
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid engine config at {}", path.display()))
    }

    /// Load using env var + fallbacks, then apply the threshold override.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{} points to non-existent path", ENV_CONFIG_PATH));
            }
            Self::load_from(&pb)?
        } else {
            let p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if p.exists() {
                Self::load_from(&p)?
            } else {
                tracing::info!(target: "config", "no config file found, using built-in seed");
                Self::default_seed()
            }
        };

        if let Some(t) = parse_threshold_env(std::env::var(ENV_ACCEPT_THRESHOLD).ok()) {
            cfg.classifier.accept_threshold = t;
        }
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.classifier.validate()?;
        if let Some(w) = &self.widen {
            // At threshold 0 every keyword-free short body would pass.
            if w.floor == 0 {
                return Err(anyhow!("widen.floor must be at least 1"));
            }
            if w.floor > self.classifier.accept_threshold {
                return Err(anyhow!(
                    "widen.floor ({}) is above accept_threshold ({})",
                    w.floor,
                    self.classifier.accept_threshold
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.dedup.title_similarity) {
            return Err(anyhow!(
                "dedup.title_similarity must be within 0.0..=1.0, got {}",
                self.dedup.title_similarity
            ));
        }
        if self.sections.default_section.trim().is_empty() {
            return Err(anyhow!("sections.default_section must not be blank"));
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.classifier = self.classifier.normalized();
        if self.sections.order.is_empty() {
            self.sections.order = vec![self.sections.default_section.clone()];
        }
        self
    }

    /// The original gazette setup: HN + ArXiv, gatekeeper lists, ArXiv desks.
    pub fn default_seed() -> Self {
        Self {
            classifier: ClassifierConfig::gazette_seed(),
            sections: SectionConfig::arxiv_desks(),
            assembly: AssemblyConfig::default(),
            widen: None,
            dedup: DedupConfig::default(),
            sources: SourcesConfig::gazette_seed(),
        }
    }
}

// parse optional integer env; garbage is ignored
fn parse_threshold_env(raw: Option<String>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
}
