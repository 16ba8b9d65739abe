//! LanceDB connection and table housekeeping.
use anyhow::Result;
use arrow_array::RecordBatchIterator;
use lancedb::{connect, Connection};
use std::path::Path;
use tracing::info;

use crate::schema::build_embeddings_schema;

pub async fn open_db(db_path: &Path) -> Result<Connection> {
    Ok(connect(db_path.to_string_lossy().as_ref()).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(conn
        .table_names()
        .execute()
        .await?
        .iter()
        .any(|t| t == name))
}

/// Create an empty embeddings table unless one already exists.
pub async fn ensure_embeddings_table(conn: &Connection, name: &str, dim: i32) -> Result<()> {
    if table_exists(conn, name).await? {
        return Ok(());
    }
    let schema = build_embeddings_schema(dim);
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
    conn.create_table(name, Box::new(iter)).execute().await?;
    Ok(())
}

/// Drop `name` through the connection if it is present (root namespace).
pub async fn drop_table_if_exists(conn: &Connection, name: &str) -> Result<bool> {
    if !table_exists(conn, name).await? {
        return Ok(false);
    }
    info!(table = name, "dropping existing table");
    conn.drop_table(name, &[]).await?;
    Ok(true)
}
