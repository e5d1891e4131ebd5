// Retrieval-augmented correction pipeline
// embed -> top-k retrieval -> grounding context -> correction, aborting on the first failing stage


use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use crate::RagError;
use crate::correction::{Corrector, GroundingTerm};
use crate::database::{SearchResult, VectorIndex};
use crate::embeddings::Embedder;

/// The step of a command that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Capture,
    Transcription,
    Embedding,
    Collection,
    Upsert,
    Retrieval,
    Correction,
}

impl fmt::Display for Stage {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Capture => "capture",
            Self::Transcription => "transcription",
            Self::Embedding => "embedding",
            Self::Collection => "collection",
            Self::Upsert => "upsert",
            Self::Retrieval => "retrieval",
            Self::Correction => "correction",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{stage} failed")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: RagError,
}

pub type PipelineResult<T> = std::result::Result<T, StageError>;

/// Tag a gateway error with the stage it happened in
pub trait StageContext<T> {
    fn at_stage(self, stage: Stage) -> PipelineResult<T>;
}

impl<T> StageContext<T> for crate::Result<T> {
    #[inline]
    fn at_stage(self, stage: Stage) -> PipelineResult<T> {
        self.map_err(|source| StageError { stage, source })
    }
}

/// Output of a transcript correction, including the grounding it used
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub raw: String,
    pub context: Vec<SearchResult>,
    pub corrected: String,
}

/// Embed-and-rank half of the pipeline, used on its own for search
#[derive(Clone, Copy)]
pub struct Retriever<'a> {
    embedder: &'a dyn Embedder,
    index: &'a dyn VectorIndex,
}

impl<'a> Retriever<'a> {
    #[inline]
    pub fn new(embedder: &'a dyn Embedder, index: &'a dyn VectorIndex) -> Self {
        Self { embedder, index }
    }

    /// Rank glossary terms against `query`, best first
    #[inline]
    pub async fn search_terms(&self, query: &str, limit: usize) -> PipelineResult<Vec<SearchResult>> {
        let vector = self.embedder.embed(query).await.at_stage(Stage::Embedding)?;
        debug!("Embedded query into {} dimensions", vector.len());

        let results = self
            .index
            .query(&vector, limit)
            .await
            .at_stage(Stage::Retrieval)?;
        debug!("Retrieved {} terms (limit {})", results.len(), limit);

        Ok(results)
    }
}

pub struct RagPipeline<'a> {
    retriever: Retriever<'a>,
    corrector: &'a dyn Corrector,
    correction_limit: usize,
}

impl<'a> RagPipeline<'a> {
    #[inline]
    pub fn new(
        embedder: &'a dyn Embedder,
        index: &'a dyn VectorIndex,
        corrector: &'a dyn Corrector,
        correction_limit: usize,
    ) -> Self {
        Self {
            retriever: Retriever::new(embedder, index),
            corrector,
            correction_limit,
        }
    }

    #[inline]
    pub fn retriever(&self) -> Retriever<'a> {
        self.retriever
    }

    /// Correct misheard jargon in `raw` using the closest glossary terms as grounding
    #[inline]
    pub async fn correct_transcript(&self, raw: &str) -> PipelineResult<Correction> {
        let context = self
            .retriever
            .search_terms(raw, self.correction_limit)
            .await?;

        if context.is_empty() {
            info!("No glossary terms retrieved, correcting without grounding");
        }

        let terms: Vec<GroundingTerm> = context.iter().map(GroundingTerm::from).collect();
        let corrected = self
            .corrector
            .correct(raw, &terms)
            .await
            .at_stage(Stage::Correction)?;

        info!(
            "Corrected transcript using {} grounding terms",
            terms.len()
        );

        Ok(Correction {
            raw: raw.to_string(),
            context,
            corrected,
        })
    }
}
