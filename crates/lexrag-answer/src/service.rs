use anyhow::Result;
use std::time::Instant;
use tracing::info;

use lexrag_core::{RagResponse, RetrievalParams};
use lexrag_retrieve::RetrievalEngine;

use crate::composer::AnswerComposer;

/// Retrieval engine plus answer composer: the whole question → answer path.
///
/// Constructed once at startup and passed by reference to whatever front end
/// drives it.
pub struct RagService {
    engine: RetrievalEngine,
    composer: AnswerComposer,
    params: RetrievalParams,
}

impl RagService {
    pub fn new(
        engine: RetrievalEngine,
        composer: AnswerComposer,
        params: RetrievalParams,
    ) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            engine,
            composer,
            params,
        })
    }

    pub fn params(&self) -> &RetrievalParams {
        &self.params
    }

    pub fn ask(&self, query: &str) -> Result<RagResponse> {
        self.ask_with(query, &self.params)
    }

    pub fn ask_with(&self, query: &str, params: &RetrievalParams) -> Result<RagResponse> {
        let start = Instant::now();
        let retrieval = self.engine.retrieve(query, params)?;
        let answer = self.composer.compose(&retrieval.context, query)?;
        info!(
            citations = retrieval.results.len(),
            elapsed = ?start.elapsed(),
            "answered query"
        );
        Ok(RagResponse {
            answer,
            citations: retrieval.results,
        })
    }
}
