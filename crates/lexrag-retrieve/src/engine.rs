use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lexrag_core::{
    DeduplicatedResult, Embedder, EntryCatalog, Error, RetrievalParams, VectorIndex,
};

use crate::dedup::ClusterSlots;

/// Output of one retrieval pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retrieval {
    pub context: String,
    pub results: Vec<DeduplicatedResult>,
}

/// Query → top-k hits → near-duplicate merge → context.
///
/// Holds the process-wide read-only collaborators; one instance serves every
/// query.
pub struct RetrievalEngine {
    embedder: Box<dyn Embedder>,
    index: Box<dyn VectorIndex>,
    catalog: EntryCatalog,
}

impl RetrievalEngine {
    /// Fails with [`Error::CatalogIndexMisalignment`] when the catalog and the
    /// index disagree on the number of entries.
    pub fn new(
        embedder: Box<dyn Embedder>,
        index: Box<dyn VectorIndex>,
        catalog: EntryCatalog,
    ) -> Result<Self, Error> {
        if catalog.len() != index.len() {
            return Err(Error::CatalogIndexMisalignment {
                catalog: catalog.len(),
                index: index.len(),
            });
        }
        info!(entries = catalog.len(), dim = index.dim(), "retrieval engine ready");
        Ok(Self {
            embedder,
            index,
            catalog,
        })
    }

    pub fn catalog(&self) -> &EntryCatalog {
        &self.catalog
    }

    pub fn retrieve(&self, query: &str, params: &RetrievalParams) -> Result<Retrieval> {
        params.validate()?;
        let query_embedding = self.embedder.embed(query)?;
        let hits = self.index.search(&query_embedding, params.top_k)?;
        debug!(top_k = params.top_k, hits = hits.len(), "index search");

        let mut slots = ClusterSlots::new();
        let mut examined = 0usize;
        for hit in hits {
            if slots.len() >= params.max_results {
                break;
            }
            let hit = self.catalog.resolve(hit)?;
            let embedding = self.embedder.embed(&hit.entry.text)?;
            examined += 1;
            slots.offer(embedding, hit, params.similarity_threshold)?;
        }

        let context = slots.context();
        let results = slots.into_results();
        info!(
            examined,
            kept = results.len(),
            context_chars = context.chars().count(),
            "retrieval complete"
        );
        Ok(Retrieval { context, results })
    }
}
