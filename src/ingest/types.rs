// src/ingest/types.rs
use anyhow::Result;

use crate::item::CandidateItem;

/// A source that yields a finite, ordered batch of candidate items.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>>;
    fn name(&self) -> &str;
}
