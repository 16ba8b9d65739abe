//! Wiring from [`Settings`] to a ready [`RagService`], and the offline index
//! build.
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::info;

use lexrag_answer::{AnswerComposer, CompletionsGenerator, RagService};
use lexrag_core::config::{IndexBackend, Settings};
use lexrag_core::{Embedder, EntryCatalog, Generator, VectorIndex};
use lexrag_embed::embedder_for;
use lexrag_retrieve::RetrievalEngine;
use lexrag_vector::{FlatIndex, IndexWriter, LanceVectorIndex};

pub fn build_embedder(settings: &Settings) -> Result<Box<dyn Embedder>> {
    embedder_for(&settings.embedding, &settings.paths.model_dir)
}

pub fn load_catalog(settings: &Settings) -> Result<EntryCatalog> {
    EntryCatalog::load_with_prefix(
        &settings.paths.catalog,
        settings.catalog.strip_source_prefix.as_deref(),
    )
}

/// Embed every catalog entry in order.
pub fn embed_catalog(embedder: &dyn Embedder, catalog: &EntryCatalog) -> Result<Vec<Vec<f32>>> {
    let pb = ProgressBar::new(catalog.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
                 {pos}/{len} entries ({percent}%) {msg}",
            )?
            .progress_chars("#>-"),
    );
    let mut embeddings = Vec::with_capacity(catalog.len());
    for (i, entry) in catalog.iter().enumerate() {
        let v = embedder
            .embed(&entry.text)
            .with_context(|| format!("embedding catalog entry {i}"))?;
        embeddings.push(v);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(embeddings)
}

/// Open the configured index. The memory backend embeds the catalog now.
/// Must be called outside any tokio runtime.
pub fn build_index(
    settings: &Settings,
    embedder: &dyn Embedder,
    catalog: &EntryCatalog,
) -> Result<Box<dyn VectorIndex>> {
    let metric = settings.index.metric;
    match settings.index.backend {
        IndexBackend::Lance => {
            let index =
                LanceVectorIndex::open(&settings.paths.index_dir, &settings.paths.table, metric)?;
            Ok(Box::new(index))
        }
        IndexBackend::Memory => {
            info!(entries = catalog.len(), "embedding catalog into in-memory index");
            let vectors = embed_catalog(embedder, catalog)?;
            let index = FlatIndex::from_vectors(embedder.dim(), metric, vectors)?;
            Ok(Box::new(index))
        }
    }
}

pub fn build_engine(settings: &Settings) -> Result<RetrievalEngine> {
    let embedder = build_embedder(settings)?;
    let catalog = load_catalog(settings)?;
    let index = build_index(settings, embedder.as_ref(), &catalog)?;
    Ok(RetrievalEngine::new(embedder, index, catalog)?)
}

pub fn build_service_with(
    settings: &Settings,
    generator: Box<dyn Generator>,
) -> Result<RagService> {
    let engine = build_engine(settings)?;
    let composer = AnswerComposer::new(generator, settings.generation.params());
    RagService::new(engine, composer, settings.retrieval)
}

/// Full service with the HTTP completions backend from `generation`.
pub fn build_service(settings: &Settings) -> Result<RagService> {
    let generator = CompletionsGenerator::from_config(&settings.generation)?;
    info!(
        endpoint = %settings.generation.endpoint,
        model = %settings.generation.model,
        "generation backend configured"
    );
    build_service_with(settings, Box::new(generator))
}

/// Embed the catalog and (re)write the LanceDB table. With `from_dir`, the
/// catalog is first rebuilt from the `.txt` files there and saved to
/// `paths.catalog`. Returns the number of vectors written.
pub fn index_corpus(settings: &Settings, from_dir: Option<&Path>) -> Result<usize> {
    let catalog = match from_dir {
        Some(dir) => {
            let catalog = EntryCatalog::from_directory(dir)?;
            catalog.write_to(&settings.paths.catalog)?;
            info!(
                path = %settings.paths.catalog.display(),
                entries = catalog.len(),
                "wrote entry catalog"
            );
            load_catalog(settings)?
        }
        None => load_catalog(settings)?,
    };
    let embedder = build_embedder(settings)?;
    let embeddings = embed_catalog(embedder.as_ref(), &catalog)?;
    let dim = embedder.dim();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let writer =
            IndexWriter::new(&settings.paths.index_dir, &settings.paths.table, dim).await?;
        writer.write(&embeddings).await
    })
}
