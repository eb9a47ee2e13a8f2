// src/rank.rs
//! Priority ranking of accepted items.
//!
//! Order: score desc → `published_at` desc (dated items before undated) → input index asc.
//! `sort_by` is stable and the index is the final key, so identical input always
//! produces identical output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::item::CandidateItem;
use crate::relevance::{ClassificationVerdict, ReasonCode};

/// An accepted item with its priority score and original position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedItem {
    pub item: CandidateItem,
    pub score: u32,
    pub reason: ReasonCode,
    #[serde(skip)]
    pub index: usize,
}

fn cmp_recency(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Keep accepted items only and sort them into priority order.
pub fn rank(items: Vec<(CandidateItem, ClassificationVerdict)>) -> Vec<RankedItem> {
    let mut out: Vec<RankedItem> = items
        .into_iter()
        .enumerate()
        .filter(|(_, (_, v))| v.accepted)
        .map(|(index, (item, v))| RankedItem {
            item,
            score: v.score,
            reason: v.reason,
            index,
        })
        .collect();

    out.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| cmp_recency(a.item.published_at, b.item.published_at))
            .then_with(|| a.index.cmp(&b.index))
    });
    out
}
