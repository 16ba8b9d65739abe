//! Greedy near-duplicate merge over ranked search hits.
//!
//! Each kept result owns a slot. A candidate is compared (cosine) against the
//! representative embedding of every slot:
//! - best similarity below the threshold: the candidate opens a new slot;
//! - otherwise it competes for the best-matching slot and replaces it only if
//!   its text is strictly longer (in characters).
//!
//! Slots never move, so the result order is the order in which clusters were
//! first seen. The pass is single and order-dependent; it never re-clusters.
use tracing::debug;

use lexrag_core::similarity::most_similar;
use lexrag_core::{DeduplicatedResult, Error, SearchHit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Added(usize),
    Replaced(usize),
    Discarded(usize),
}

#[derive(Debug, Clone)]
struct Slot {
    embedding: Vec<f32>,
    result: DeduplicatedResult,
}

#[derive(Debug, Clone, Default)]
pub struct ClusterSlots {
    slots: Vec<Slot>,
}

impl ClusterSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Merge one candidate. Similarity ties resolve to the lowest slot; a
    /// similarity equal to `threshold` counts as a duplicate.
    pub fn offer(
        &mut self,
        embedding: Vec<f32>,
        candidate: SearchHit,
        threshold: f32,
    ) -> Result<MergeOutcome, Error> {
        let representatives = self.slots.iter().map(|s| s.embedding.as_slice());
        let best = most_similar(&embedding, representatives)?;
        match best {
            Some((slot, similarity)) if similarity >= threshold => {
                let kept = &mut self.slots[slot];
                let candidate_len = candidate.entry.text.chars().count();
                let kept_len = kept.result.text.chars().count();
                if candidate_len > kept_len {
                    debug!(
                        slot,
                        similarity,
                        candidate_len,
                        kept_len,
                        "near-duplicate replaces shorter representative"
                    );
                    kept.embedding = embedding;
                    kept.result = candidate.into();
                    Ok(MergeOutcome::Replaced(slot))
                } else {
                    debug!(
                        slot,
                        similarity, candidate_len, kept_len, "near-duplicate discarded"
                    );
                    Ok(MergeOutcome::Discarded(slot))
                }
            }
            best => {
                let slot = self.slots.len();
                debug!(slot, best_similarity = ?best.map(|(_, s)| s), "distinct entry kept");
                self.slots.push(Slot {
                    embedding,
                    result: candidate.into(),
                });
                Ok(MergeOutcome::Added(slot))
            }
        }
    }

    pub fn results(&self) -> impl Iterator<Item = &DeduplicatedResult> {
        self.slots.iter().map(|s| &s.result)
    }

    /// Kept texts in slot order, separated by a single space.
    pub fn context(&self) -> String {
        self.results()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn into_results(self) -> Vec<DeduplicatedResult> {
        self.slots.into_iter().map(|s| s.result).collect()
    }
}
