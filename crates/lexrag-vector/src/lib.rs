//! lexrag-vector
//!
//! Nearest-neighbour indexes over corpus embeddings: an exact in-memory
//! [`FlatIndex`] and a LanceDB-backed [`LanceVectorIndex`], plus the async
//! [`IndexWriter`] that builds the LanceDB table.
pub mod flat;
pub mod lance;
pub mod schema;
pub mod table;
pub mod writer;

pub use flat::FlatIndex;
pub use lance::LanceVectorIndex;
pub use writer::IndexWriter;
