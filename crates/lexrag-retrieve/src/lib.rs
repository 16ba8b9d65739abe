//! lexrag-retrieve
//!
//! The retrieval core: embeds the query, pulls the top-k entries from the
//! vector index, merges near-duplicates greedily and assembles the context
//! string handed to the answer composer.
pub mod dedup;
pub mod engine;

pub use dedup::{ClusterSlots, MergeOutcome};
pub use engine::{Retrieval, RetrievalEngine};
