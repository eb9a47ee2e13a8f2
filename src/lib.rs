// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod assemble;
pub mod config;
pub mod item;
pub mod pipeline;
pub mod rank;
pub mod relevance;
pub mod sections;

// Fetch adapters, normalization and dedup (async; outside the pure core)
pub mod ingest;

// ---- Re-exports for stable public API ----
pub use crate::assemble::{assemble, AssemblyConfig, Badge, RankedBatch, RankedEntry, SectionBucket};
pub use crate::config::EngineConfig;
pub use crate::item::CandidateItem;
pub use crate::pipeline::{run_pipeline, Pipeline, PipelineOutput, PipelineStats, WidenConfig};
pub use crate::rank::{rank, RankedItem};
pub use crate::relevance::{
    classify, BelowThresholdPolicy, ClassificationVerdict, ClassifierConfig, MatchScope, ReasonCode,
};
pub use crate::sections::{categorize, SectionConfig};
