// Indexer module
// Seeds the glossary collection: every corpus entry is embedded and upserted under its position

use tracing::{debug, info};

use crate::corpus::CorpusEntry;
use crate::database::{TermRecord, VectorIndex};
use crate::embeddings::Embedder;
use crate::pipeline::{PipelineResult, Stage, StageContext};


/// Loads a corpus into the vector index, one confirmed write at a time
pub struct CorpusSeeder<'a> {
    embedder: &'a dyn Embedder,
    index: &'a dyn VectorIndex,
}

impl<'a> CorpusSeeder<'a> {
    #[inline]
    pub fn new(embedder: &'a dyn Embedder, index: &'a dyn VectorIndex) -> Self {
        Self { embedder, index }
    }

    #[inline]
    pub async fn seed(&self, entries: &[CorpusEntry]) -> PipelineResult<usize> {
        self.seed_with_progress(entries, |_, _| {}).await
    }

    /// Seed `entries` in order, calling `on_seeded` after each committed upsert.
    ///
    /// Ids are corpus positions, so re-seeding an unchanged corpus overwrites the same records.
    /// The first failure aborts; records already written stay in place.
    #[inline]
    pub async fn seed_with_progress<F>(
        &self,
        entries: &[CorpusEntry],
        mut on_seeded: F,
    ) -> PipelineResult<usize>
    where
        F: FnMut(u64, &CorpusEntry) + Send,
    {
        self.index
            .ensure_collection()
            .await
            .at_stage(Stage::Collection)?;

        info!("Seeding {} corpus entries", entries.len());

        for (position, entry) in entries.iter().enumerate() {
            let id = position as u64;
            let vector = self
                .embedder
                .embed(&entry.embedding_text())
                .await
                .at_stage(Stage::Embedding)?;

            let record = TermRecord {
                id,
                term: entry.term.clone(),
                definition: entry.definition.clone(),
                vector,
            };
            self.index.upsert(&record).await.at_stage(Stage::Upsert)?;

            debug!("Seeded record {} ({})", id, entry.term);
            on_seeded(id, entry);
        }

        info!("Seeded {} corpus entries", entries.len());
        Ok(entries.len())
    }
}
