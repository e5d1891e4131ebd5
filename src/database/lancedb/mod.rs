// LanceDB vector database module
// Schema and column layout of a term collection


pub mod vector_store;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{RagError, Result};

pub use vector_store::LanceVectorIndex;

pub const ID_COLUMN: &str = "id";
pub const VECTOR_COLUMN: &str = "vector";
pub const TERM_COLUMN: &str = "term";
pub const DEFINITION_COLUMN: &str = "definition";
pub const DISTANCE_COLUMN: &str = "_distance";

/// Schema metadata key recording the collection's distance metric
pub const DISTANCE_METADATA_KEY: &str = "distance";
pub const COSINE: &str = "cosine";

/// Arrow schema of a term collection with `dimension`-wide vectors
#[inline]
pub fn term_schema(dimension: usize) -> Result<SchemaRef> {
    let width = i32::try_from(dimension).map_err(|_| {
        RagError::Validation(format!(
            "vector dimension {} exceeds the maximum of {}",
            dimension,
            i32::MAX
        ))
    })?;
    let metadata = HashMap::from([(DISTANCE_METADATA_KEY.to_string(), COSINE.to_string())]);

    Ok(Arc::new(Schema::new_with_metadata(
        vec![
            Field::new(ID_COLUMN, DataType::UInt64, false),
            Field::new(
                VECTOR_COLUMN,
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    width,
                ),
                false,
            ),
            Field::new(TERM_COLUMN, DataType::Utf8, false),
            Field::new(DEFINITION_COLUMN, DataType::Utf8, false),
        ],
        metadata,
    )))
}

/// Vector width declared by a collection schema, if it has a vector column
#[inline]
pub fn schema_dimension(schema: &Schema) -> Option<usize> {
    schema
        .field_with_name(VECTOR_COLUMN)
        .ok()
        .and_then(|field| match field.data_type() {
            DataType::FixedSizeList(_, size) => usize::try_from(*size).ok(),
            _ => None,
        })
}
