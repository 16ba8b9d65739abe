use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Catalog has {catalog} entries but the vector index holds {index} vectors")]
    CatalogIndexMisalignment { catalog: usize, index: usize },

    #[error("Malformed catalog line {line}: expected 2 tab-separated fields, found {fields}")]
    MalformedCatalogLine { line: usize, fields: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
