use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const POSITION_COLUMN: &str = "position";
pub const VECTOR_COLUMN: &str = "vector";
pub const DISTANCE_COLUMN: &str = "_distance";

/// Embeddings table: one row per catalog entry, `position` is the entry ordinal.
pub fn build_embeddings_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(POSITION_COLUMN, DataType::Int64, false),
        Field::new(
            VECTOR_COLUMN,
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}

/// Vector width declared by a table schema, if it has a fixed-size vector column.
pub fn vector_dim(schema: &Schema) -> Option<usize> {
    let field = schema.field_with_name(VECTOR_COLUMN).ok()?;
    match field.data_type() {
        DataType::FixedSizeList(_, dim) => usize::try_from(*dim).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim_round_trips_through_schema() {
        assert_eq!(vector_dim(&build_embeddings_schema(1024)), Some(1024));
        let bare = Schema::new(vec![Field::new(VECTOR_COLUMN, DataType::Utf8, false)]);
        assert_eq!(vector_dim(&bare), None);
    }
}
