//! Read side of the LanceDB embeddings table behind the blocking
//! [`VectorIndex`] interface.
use anyhow::{anyhow, Result};
use arrow_array::{Float32Array, Int64Array, RecordBatch};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use std::cmp::Ordering;
use std::path::Path;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use lexrag_core::{Error, IndexHit, Metric, VectorIndex};

use crate::schema::{vector_dim, DISTANCE_COLUMN, POSITION_COLUMN, VECTOR_COLUMN};
use crate::table::{open_db, table_exists};

pub fn distance_type(metric: Metric) -> DistanceType {
    match metric {
        Metric::L2 => DistanceType::L2,
        Metric::Cosine => DistanceType::Cosine,
        Metric::Dot => DistanceType::Dot,
    }
}

/// Owns a single-threaded runtime so callers stay synchronous. Must not be
/// used from inside another tokio runtime.
pub struct LanceVectorIndex {
    runtime: Runtime,
    table: Table,
    metric: Metric,
    dim: usize,
    len: usize,
}

impl LanceVectorIndex {
    pub fn open(db_path: &Path, table_name: &str, metric: Metric) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (table, dim, len) = runtime.block_on(async {
            let db = open_db(db_path).await?;
            if !table_exists(&db, table_name).await? {
                return Err(anyhow::Error::from(Error::NotFound(format!(
                    "table '{}' in {}",
                    table_name,
                    db_path.display()
                ))));
            }
            let table = db.open_table(table_name).execute().await?;
            let schema = table.schema().await?;
            let dim = vector_dim(&schema).ok_or_else(|| {
                anyhow!(
                    "table '{}' has no fixed-size '{}' column",
                    table_name,
                    VECTOR_COLUMN
                )
            })?;
            let len = table.count_rows(None).await?;
            Ok::<_, anyhow::Error>((table, dim, len))
        })?;
        info!(table = table_name, dim, len, ?metric, "opened LanceDB index");
        Ok(Self {
            runtime,
            table,
            metric,
            dim,
            len,
        })
    }

    async fn query(&self, query: &[f32], k: usize) -> Result<Vec<IndexHit>> {
        let mut stream = self
            .table
            .vector_search(query.to_vec())?
            .column(VECTOR_COLUMN)
            .distance_type(distance_type(self.metric))
            .limit(k)
            .execute()
            .await?;
        let mut hits = Vec::with_capacity(k);
        while let Some(batch) = stream.try_next().await? {
            collect_hits(&batch, &mut hits)?;
        }
        Ok(hits)
    }
}

fn collect_hits(batch: &RecordBatch, hits: &mut Vec<IndexHit>) -> Result<()> {
    let positions = batch
        .column_by_name(POSITION_COLUMN)
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
        .ok_or_else(|| anyhow!("'{}' column missing from search results", POSITION_COLUMN))?;
    let distances = batch
        .column_by_name(DISTANCE_COLUMN)
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| anyhow!("'{}' column missing from search results", DISTANCE_COLUMN))?;
    for i in 0..batch.num_rows() {
        hits.push(IndexHit {
            position: usize::try_from(positions.value(i))?,
            distance: distances.value(i),
        });
    }
    Ok(())
}

impl VectorIndex for LanceVectorIndex {
    fn dim(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.len
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<IndexHit>> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            }
            .into());
        }
        if k == 0 || self.len == 0 {
            return Ok(Vec::new());
        }
        let mut hits = self.runtime.block_on(self.query(query, k.min(self.len)))?;
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);
        debug!(k, returned = hits.len(), "lance search");
        Ok(hits)
    }
}
