
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt64Array,
};
use arrow::datatypes::{DataType, Field, SchemaRef};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::table::Table;
use lancedb::{Connection, DistanceType};
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    COSINE, DEFINITION_COLUMN, DISTANCE_COLUMN, DISTANCE_METADATA_KEY, ID_COLUMN, TERM_COLUMN,
    VECTOR_COLUMN, schema_dimension, term_schema,
};
use crate::config::Config;
use crate::database::{SearchResult, TermRecord, VectorIndex};
use crate::{RagError, Result};

/// Term collection stored in a LanceDB table
///
/// The connection lives as long as this value; dropping it releases the store.
pub struct LanceVectorIndex {
    connection: Connection,
    uri: String,
    collection: String,
    dimension: usize,
}

impl LanceVectorIndex {
    /// Open the vector store described by `config`
    #[inline]
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::open(
            &config.vector_store_uri(),
            &config.collection.name,
            config.embedding_dimension(),
        )
        .await
    }

    /// Open the store at `uri` for a collection of `dimension`-wide vectors
    #[inline]
    pub async fn open(uri: &str, collection: &str, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RagError::Validation(
                "vector dimension must be at least 1".to_string(),
            ));
        }
        term_schema(dimension)?;

        if !uri.contains("://") {
            std::fs::create_dir_all(uri).map_err(|e| {
                RagError::Database(format!("Failed to create vector store directory: {}", e))
            })?;
        }

        debug!("Connecting to LanceDB at {}", uri);
        let connection = lancedb::connect(uri)
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to connect to LanceDB: {}", e)))?;

        Ok(Self {
            connection,
            uri: uri.to_string(),
            collection: collection.to_string(),
            dimension,
        })
    }

    #[inline]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[inline]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub async fn collection_exists(&self) -> Result<bool> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to list collections: {}", e)))?;

        Ok(table_names.contains(&self.collection))
    }

    /// Vector width recorded by the existing collection
    #[inline]
    pub async fn collection_dimension(&self) -> Result<Option<usize>> {
        let table = self.open_table().await?;
        let schema = table
            .schema()
            .await
            .map_err(|e| RagError::Database(format!("Failed to read collection schema: {}", e)))?;

        Ok(schema_dimension(&schema))
    }

    /// Number of records in the collection
    #[inline]
    pub async fn count(&self) -> Result<usize> {
        let table = self.open_table().await?;
        table
            .count_rows(None)
            .await
            .map_err(|e| RagError::Database(format!("Failed to count records: {}", e)))
    }

    async fn open_table(&self) -> Result<Table> {
        match self.connection.open_table(&self.collection).execute().await {
            Ok(table) => Ok(table),
            Err(lancedb::Error::TableNotFound { .. }) => {
                Err(RagError::CollectionNotFound(self.collection.clone()))
            }
            Err(e) => Err(RagError::Database(format!(
                "Failed to open collection {}: {}",
                self.collection, e
            ))),
        }
    }

    /// Reject an existing collection whose layout differs from the configured one
    async fn verify_existing_collection(&self) -> Result<()> {
        let table = self.open_table().await?;
        let schema = table
            .schema()
            .await
            .map_err(|e| RagError::Database(format!("Failed to read collection schema: {}", e)))?;

        let existing = schema_dimension(&schema).ok_or_else(|| {
            RagError::Validation(format!(
                "collection {} has no fixed-size {} column",
                self.collection, VECTOR_COLUMN
            ))
        })?;

        if existing != self.dimension {
            return Err(RagError::Validation(format!(
                "collection {} stores {}-dimensional vectors but the embedding model is configured for {}; recreate the collection or fix models.embedding_dimension",
                self.collection, existing, self.dimension
            )));
        }

        if let Some(metric) = schema.metadata().get(DISTANCE_METADATA_KEY) {
            if metric != COSINE {
                return Err(RagError::Validation(format!(
                    "collection {} uses {} distance, expected {}",
                    self.collection, metric, COSINE
                )));
            }
        }

        Ok(())
    }

    fn check_dimension(&self, vector: &[f32], what: &str) -> Result<()> {
        if vector.len() == self.dimension {
            Ok(())
        } else {
            Err(RagError::Validation(format!(
                "{} has {} dimensions, collection {} expects {}",
                what,
                vector.len(),
                self.collection,
                self.dimension
            )))
        }
    }

    fn schema(&self) -> Result<SchemaRef> {
        term_schema(self.dimension)
    }

    fn create_record_batch(&self, record: &TermRecord) -> Result<RecordBatch> {
        let schema = self.schema()?;

        let (item_field, width) = match schema.field_with_name(VECTOR_COLUMN).map(Field::data_type) {
            Ok(DataType::FixedSizeList(item, width)) => (Arc::clone(item), *width),
            _ => {
                return Err(RagError::Database(
                    "Term schema is missing its vector column".to_string(),
                ));
            }
        };

        let values = Float32Array::from(record.vector.clone());
        let vector_array =
            FixedSizeListArray::try_new(item_field, width, Arc::new(values), None)
                .map_err(|e| RagError::Database(format!("Failed to create vector array: {}", e)))?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(UInt64Array::from(vec![record.id])),
            Arc::new(vector_array),
            Arc::new(StringArray::from(vec![record.term.as_str()])),
            Arc::new(StringArray::from(vec![record.definition.as_str()])),
        ];

        RecordBatch::try_new(schema, arrays)
            .map_err(|e| RagError::Database(format!("Failed to create record batch: {}", e)))
    }

    /// Parse one batch of query output into search results
    fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<SearchResult>> {
        let terms = string_column(batch, TERM_COLUMN)?;
        let definitions = string_column(batch, DEFINITION_COLUMN)?;
        let distances = batch
            .column_by_name(DISTANCE_COLUMN)
            .ok_or_else(|| RagError::Decode(format!("Missing {} column", DISTANCE_COLUMN)))?
            .as_any()
            .downcast_ref::<Float32Array>()
            .ok_or_else(|| RagError::Decode(format!("Invalid {} column type", DISTANCE_COLUMN)))?;

        Ok((0..batch.num_rows())
            .map(|row| SearchResult {
                term: terms.value(row).to_string(),
                definition: definitions.value(row).to_string(),
                // Cosine distance is 1 - similarity
                score: 1.0 - distances.value(row),
            })
            .collect())
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| RagError::Decode(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| RagError::Decode(format!("Invalid {} column type", name)))
}

#[async_trait]
impl VectorIndex for LanceVectorIndex {
    async fn ensure_collection(&self) -> Result<()> {
        if self.collection_exists().await? {
            debug!("Collection {} already exists, verifying layout", self.collection);
            return self.verify_existing_collection().await;
        }

        self.connection
            .create_empty_table(&self.collection, self.schema()?)
            .execute()
            .await
            .map_err(|e| {
                RagError::Database(format!(
                    "Failed to create collection {}: {}",
                    self.collection, e
                ))
            })?;

        info!(
            "Created collection {} ({} dimensions, cosine distance)",
            self.collection, self.dimension
        );
        Ok(())
    }

    async fn upsert(&self, record: &TermRecord) -> Result<()> {
        self.check_dimension(&record.vector, &format!("vector for record {}", record.id))?;

        let table = self.open_table().await?;
        let batch = self.create_record_batch(record)?;
        let schema = batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(batch)), schema);

        let mut merge = table.merge_insert(&[ID_COLUMN]);
        merge
            .when_matched_update_all(None)
            .when_not_matched_insert_all();
        merge.execute(Box::new(reader)).await.map_err(|e| {
            RagError::Database(format!("Failed to upsert record {}: {}", record.id, e))
        })?;

        debug!("Upserted record {} ({})", record.id, record.term);
        Ok(())
    }

    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        if limit == 0 {
            return Err(RagError::Validation(
                "query limit must be at least 1".to_string(),
            ));
        }
        self.check_dimension(vector, "query vector")?;

        let table = self.open_table().await?;
        let rows = table
            .count_rows(None)
            .await
            .map_err(|e| RagError::Database(format!("Failed to count records: {}", e)))?;
        if rows == 0 {
            debug!("Collection {} is empty", self.collection);
            return Ok(Vec::new());
        }

        let mut stream = table
            .vector_search(vector)
            .map_err(|e| RagError::Database(format!("Failed to create vector search: {}", e)))?
            .column(VECTOR_COLUMN)
            .distance_type(DistanceType::Cosine)
            .bypass_vector_index()
            .limit(limit)
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to execute search: {}", e)))?;

        let mut results = Vec::new();
        while let Some(batch) = stream
            .try_next()
            .await
            .map_err(|e| RagError::Database(format!("Failed to read result stream: {}", e)))?
        {
            results.extend(Self::parse_search_batch(&batch)?);
        }

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);

        debug!(
            "Query returned {} of {} records from {}",
            results.len(),
            rows,
            self.collection
        );
        Ok(results)
    }
}
