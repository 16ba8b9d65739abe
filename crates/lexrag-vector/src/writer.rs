//! Bulk writer for the embeddings table.
//!
//! Rows are written in catalog order with `position = 0..n`, so the table and
//! the entry catalog stay aligned. Writing replaces any previous table of the
//! same name.
use anyhow::Result;
use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, Int64Array, RecordBatch, RecordBatchIterator};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use lexrag_core::Error;

use crate::schema::build_embeddings_schema;
use crate::table::{drop_table_if_exists, ensure_embeddings_table, open_db, table_exists};

const BATCH_SIZE: usize = 1000;

pub struct IndexWriter {
    db: Connection,
    table_name: String,
    dim: usize,
}

impl IndexWriter {
    pub async fn new(db_path: &Path, table_name: &str, dim: usize) -> Result<Self> {
        tokio::fs::create_dir_all(db_path).await?;
        let db = open_db(db_path).await?;
        Ok(Self {
            db,
            table_name: table_name.to_string(),
            dim,
        })
    }

    /// Replace the table with `embeddings`; returns the number of rows written.
    pub async fn write(&self, embeddings: &[Vec<f32>]) -> Result<usize> {
        let mismatch = embeddings
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != self.dim);
        if let Some((i, bad)) = mismatch {
            let err = Error::DimensionMismatch {
                expected: self.dim,
                actual: bad.len(),
            };
            return Err(anyhow::Error::new(err).context(format!("embedding at position {i}")));
        }
        drop_table_if_exists(&self.db, &self.table_name).await?;
        let dim = i32::try_from(self.dim)?;
        if embeddings.is_empty() {
            ensure_embeddings_table(&self.db, &self.table_name, dim).await?;
            info!(table = %self.table_name, "wrote empty embeddings table");
            return Ok(0);
        }

        info!(
            "Writing {} vectors into LanceDB table: {}",
            embeddings.len(),
            self.table_name
        );
        let pb = ProgressBar::new(embeddings.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
                     {pos}/{len} vectors ({percent}%) {msg}",
                )?
                .progress_chars("#>-"),
        );
        let mut written = 0usize;
        for chunk in embeddings.chunks(BATCH_SIZE) {
            let batch = self.to_record_batch(written, chunk, dim)?;
            self.insert_batch(batch).await?;
            written += chunk.len();
            pb.set_position(written as u64);
        }
        pb.finish_with_message("done");
        info!("Successfully wrote {} vectors into LanceDB", written);
        Ok(written)
    }

    async fn insert_batch(&self, batch: RecordBatch) -> Result<()> {
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        if table_exists(&self.db, &self.table_name).await? {
            self.db
                .open_table(&self.table_name)
                .execute()
                .await?
                .add(reader)
                .execute()
                .await?;
        } else {
            self.db.create_table(&self.table_name, reader).execute().await?;
        }
        Ok(())
    }

    fn to_record_batch(
        &self,
        offset: usize,
        vectors: &[Vec<f32>],
        dim: i32,
    ) -> Result<RecordBatch> {
        let positions = (offset..offset + vectors.len())
            .map(i64::try_from)
            .collect::<Result<Vec<i64>, _>>()?;
        let values = vectors
            .iter()
            .map(|v| Some(v.iter().copied().map(Some).collect::<Vec<_>>()));
        let batch = RecordBatch::try_new(
            build_embeddings_schema(dim),
            vec![
                Arc::new(Int64Array::from(positions)),
                Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
                    values, dim,
                )),
            ],
        )?;
        Ok(batch)
    }
}
