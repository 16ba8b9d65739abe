//! Shared building blocks for the legal-question RAG pipeline: domain types,
//! service traits, the entry catalog, similarity math, configuration and the
//! error enum.

pub mod catalog;
pub mod config;
pub mod error;
pub mod similarity;
pub mod traits;
pub mod types;

pub use catalog::EntryCatalog;
pub use error::Error;
pub use traits::{Embedder, GenerationParams, Generator, VectorIndex};
pub use types::{
    CorpusEntry, DeduplicatedResult, IndexHit, Metric, RagResponse, RetrievalParams, SearchHit,
};
