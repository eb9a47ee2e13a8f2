// src/pipeline.rs
//! End-to-end run over one batch: eligibility → classify (+ optional widening)
//! → rank → categorize → assemble.
//!
//! No I/O beyond tracing/metrics. The same input and config always serialize
//! to the same `RankedBatch`.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assemble::{assemble, RankedBatch};
use crate::config::EngineConfig;
use crate::item::{partition_eligible, CandidateItem};
use crate::rank::rank;
use crate::relevance::{classify, ClassificationVerdict, ReasonCode};
use crate::sections::categorize_with;

/// Lower the threshold stepwise when fewer than `min_accepted` items pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidenConfig {
    pub min_accepted: usize,
    /// Lowest threshold widening may reach (inclusive).
    pub floor: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub received: usize,
    pub malformed: usize,
    pub accepted: usize,
    pub rejected_noise: usize,
    pub rejected_insufficient: usize,
    pub trusted: usize,
    /// Effective threshold after widening, if widening ran.
    pub widened_to: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutput {
    pub batch: RankedBatch,
    pub stats: PipelineStats,
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_items_total", "Items received by the pipeline.");
        describe_counter!("pipeline_malformed_total", "Items dropped for blank title/url.");
        describe_counter!("pipeline_accepted_total", "Items accepted by the relevance gate.");
        describe_counter!("pipeline_rejected_total", "Items rejected, labelled by reason.");
        describe_gauge!("pipeline_last_batch_items", "Items emitted in the last batch.");
    });
}

pub struct Pipeline {
    cfg: EngineConfig,
}

impl Pipeline {
    pub fn new(cfg: EngineConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn run(&self, items: Vec<CandidateItem>) -> PipelineOutput {
        ensure_metrics_described();
        let mut stats = PipelineStats {
            received: items.len(),
            ..PipelineStats::default()
        };

        let (eligible, malformed) = partition_eligible(items);
        stats.malformed = malformed;

        let mut judged: Vec<(CandidateItem, ClassificationVerdict)> = eligible
            .into_iter()
            .map(|it| {
                let v = classify(&it, &self.cfg.classifier);
                (it, v)
            })
            .collect();

        if let Some(w) = self.cfg.widen {
            stats.widened_to = self.widen(&mut judged, w);
        }

        for (_, v) in &judged {
            match v.reason {
                ReasonCode::TrustedSource => {
                    stats.trusted += 1;
                    stats.accepted += 1;
                }
                ReasonCode::AcceptedByScore => stats.accepted += 1,
                ReasonCode::NoiseRejected => stats.rejected_noise += 1,
                ReasonCode::InsufficientSignal => stats.rejected_insufficient += 1,
            }
        }

        let ranked = rank(judged);
        let sections = categorize_with(ranked, &self.cfg.sections);
        let batch = assemble(sections, &self.cfg.sections.order, &self.cfg.assembly);

        counter!("pipeline_items_total").increment(stats.received as u64);
        counter!("pipeline_malformed_total").increment(stats.malformed as u64);
        counter!("pipeline_accepted_total").increment(stats.accepted as u64);
        counter!("pipeline_rejected_total", "reason" => "noise")
            .increment(stats.rejected_noise as u64);
        counter!("pipeline_rejected_total", "reason" => "insufficient")
            .increment(stats.rejected_insufficient as u64);
        gauge!("pipeline_last_batch_items").set(batch.total_items() as f64);

        info!(
            target: "pipeline",
            received = stats.received,
            malformed = stats.malformed,
            accepted = stats.accepted,
            trusted = stats.trusted,
            rejected_noise = stats.rejected_noise,
            rejected_insufficient = stats.rejected_insufficient,
            widened_to = ?stats.widened_to,
            sections = batch.len(),
            emitted = batch.total_items(),
            "batch assembled"
        );

        PipelineOutput { batch, stats }
    }

    // Re-classify InsufficientSignal items at successively lower thresholds.
    // Noise rejections are final. Returns the last threshold tried, if any.
    fn widen(
        &self,
        judged: &mut [(CandidateItem, ClassificationVerdict)],
        w: WidenConfig,
    ) -> Option<u32> {
        let base = self.cfg.classifier.accept_threshold;
        // Threshold 0 would accept keyword-free short bodies.
        let floor = w.floor.max(1);
        let mut accepted = judged.iter().filter(|(_, v)| v.accepted).count();
        if accepted >= w.min_accepted || floor >= base {
            return None;
        }

        let mut last = None;
        for threshold in (floor..base).rev() {
            let derived = self.cfg.classifier.with_threshold(threshold);
            for (item, v) in judged.iter_mut() {
                if v.reason != ReasonCode::InsufficientSignal {
                    continue;
                }
                let nv = classify(item, &derived);
                if nv.accepted {
                    accepted += 1;
                    *v = nv;
                }
            }
            last = Some(threshold);
            debug!(target: "pipeline", threshold, accepted, "widened threshold");
            if accepted >= w.min_accepted {
                break;
            }
        }
        last
    }
}

/// One-shot convenience over [`Pipeline`].
pub fn run_pipeline(items: Vec<CandidateItem>, cfg: &EngineConfig) -> PipelineOutput {
    Pipeline::new(cfg.clone()).run(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relevance::{BelowThresholdPolicy, ClassifierConfig, MatchScope};
    use crate::sections::SectionConfig;
    use std::collections::{BTreeMap, HashMap};

    fn engine(threshold: u32, widen: Option<WidenConfig>) -> EngineConfig {
        let mut kw = BTreeMap::new();
        kw.insert("transformer".to_string(), 2);
        kw.insert("inference".to_string(), 1);
        let mut map = HashMap::new();
        map.insert("cs.CV".to_string(), "Vision".to_string());
        EngineConfig {
            classifier: ClassifierConfig {
                trusted_domains: vec!["arxiv.org".into()],
                noise_phrases: vec!["we're hiring".into()],
                signal_keywords: kw,
                accept_threshold: threshold,
                min_body_length_if_no_keywords: 5,
                keyword_scope: MatchScope::TitleAndBody,
                noise_scope: MatchScope::TitleAndBody,
                trusted_requires_on_topic: false,
                on_topic_terms: Vec::new(),
                below_threshold: BelowThresholdPolicy::Reject,
                short_body_requires_threshold: false,
            },
            sections: SectionConfig {
                category_map: map,
                default_section: "General".into(),
                order: vec!["Vision".into(), "General".into()],
            },
            widen,
            ..EngineConfig::default_seed()
        }
    }

    fn batch() -> Vec<CandidateItem> {
        vec![
            CandidateItem::new("Transformer inference tricks", "https://blog.test/a"),
            CandidateItem::new("Inference on phones", "https://blog.test/b"),
            CandidateItem::new("We're hiring transformer folks", "https://blog.test/c"),
            CandidateItem::new("Segmentation paper", "https://arxiv.org/abs/1").with_category("cs.CV"),
            CandidateItem::new("", "https://blog.test/blank"),
        ]
    }

    #[test]
    fn stats_account_for_every_item() {
        let out = Pipeline::new(engine(2, None)).run(batch());
        let s = &out.stats;
        assert_eq!(s.received, 5);
        assert_eq!(s.malformed, 1);
        assert_eq!(s.accepted, 2);
        assert_eq!(s.trusted, 1);
        assert_eq!(s.rejected_noise, 1);
        assert_eq!(s.rejected_insufficient, 1);
        assert_eq!(s.widened_to, None);
        assert_eq!(out.batch.section_names(), vec!["Vision", "General"]);
    }

    #[test]
    fn widening_lowers_threshold_but_not_for_noise() {
        let w = WidenConfig {
            min_accepted: 4,
            floor: 1,
        };
        let out = Pipeline::new(engine(2, Some(w))).run(batch());
        assert_eq!(out.stats.widened_to, Some(1));
        // "Inference on phones" now passes; the hiring post stays out.
        assert_eq!(out.stats.accepted, 3);
        assert_eq!(out.stats.rejected_noise, 1);
        let general = out.batch.get("General").unwrap();
        assert!(general.items.iter().all(|e| !e.item.title.contains("hiring")));
    }

    #[test]
    fn widening_skipped_when_enough_accepted() {
        let w = WidenConfig {
            min_accepted: 1,
            floor: 1,
        };
        let out = Pipeline::new(engine(2, Some(w))).run(batch());
        assert_eq!(out.stats.widened_to, None);
        assert_eq!(out.stats.accepted, 2);
    }

    #[test]
    fn widening_never_goes_below_one() {
        let w = WidenConfig {
            min_accepted: 10,
            floor: 0,
        };
        let mut items = batch();
        items.push(CandidateItem::new("Weekend thoughts", "https://blog.test/d"));
        let out = Pipeline::new(engine(2, Some(w))).run(items);
        assert_eq!(out.stats.widened_to, Some(1));
        assert_eq!(out.stats.accepted, 3);
        assert_eq!(out.stats.rejected_insufficient, 1);
        let general = out.batch.get("General").unwrap();
        assert!(general.items.iter().all(|e| e.item.title != "Weekend thoughts"));
    }

    #[test]
    fn empty_batch_is_not_an_error() {
        let out = run_pipeline(Vec::new(), &engine(2, None));
        assert!(out.batch.is_empty());
        assert_eq!(out.stats, PipelineStats::default());
    }
}
