use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::info;

use crate::RagError;
use crate::capture;
use crate::config::Config;
use crate::corpus::load_corpus;
use crate::correction::OllamaCorrector;
use crate::database::{LanceVectorIndex, SearchResult};
use crate::embeddings::OllamaEmbedder;
use crate::indexer::CorpusSeeder;
use crate::pipeline::{Correction, RagPipeline, Retriever, Stage, StageContext, StageError};
use crate::transcription::{Transcriber, WhisperClient};

/// Embed every corpus entry and upsert it into the collection
#[inline]
pub async fn seed(config: &Config) -> Result<()> {
    let corpus_path = config.corpus_path();
    let entries = load_corpus(&corpus_path).context("corpus")?;

    let embedder = OllamaEmbedder::new(config)?;
    let index = LanceVectorIndex::connect(config)
        .await
        .at_stage(Stage::Collection)?;

    let progress = ProgressBar::new(entries.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let seeded = CorpusSeeder::new(&embedder, &index)
        .seed_with_progress(&entries, |_, entry| {
            progress.suspend(|| println!("seeded: {}", entry.term));
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    let count = seeded?;
    println!("done: {} terms seeded", count);
    Ok(())
}

/// Print the glossary terms closest to `query`
#[inline]
pub async fn search(config: &Config, query: &str) -> Result<()> {
    let embedder = OllamaEmbedder::new(config)?;
    let index = LanceVectorIndex::connect(config)
        .await
        .at_stage(Stage::Collection)?;

    let results = Retriever::new(&embedder, &index)
        .search_terms(query, config.retrieval.search_limit)
        .await?;

    if results.is_empty() {
        println!("No matching terms. Has the corpus been seeded?");
        return Ok(());
    }

    for result in &results {
        print_search_result(result);
    }
    Ok(())
}

/// Transcribe a WAV file and correct its jargon
#[inline]
pub async fn transcribe(config: &Config, audio_path: &Path) -> Result<()> {
    transcribe_and_correct(config, audio_path).await
}

/// Record from the microphone, then transcribe and correct the recording
#[inline]
pub async fn record(config: &Config, seconds: Option<u32>) -> Result<()> {
    let seconds = seconds.unwrap_or(config.capture.default_seconds);

    println!("recording {} seconds...", seconds);
    let recording = capture::record(&config.capture.program, seconds)
        .await
        .at_stage(Stage::Capture)?;
    println!("recording done");

    transcribe_and_correct(config, recording.path()).await
}

/// Describe the configured collection
#[inline]
pub async fn show_status(config: &Config) -> Result<()> {
    let index = LanceVectorIndex::connect(config)
        .await
        .at_stage(Stage::Collection)?;

    println!("{}", style("Glossary Collection").bold().cyan());
    println!("  Name: {}", index.collection());
    println!("  Vector store: {}", index.uri());
    println!("  Configured dimension: {}", index.dimension());

    if !index.collection_exists().await.at_stage(Stage::Collection)? {
        println!("  State: {}", style("not created (run 'asr-rag seed')").yellow());
        return Ok(());
    }

    let stored_dimension = index
        .collection_dimension()
        .await
        .at_stage(Stage::Collection)?;
    let count = index.count().await.at_stage(Stage::Collection)?;

    match stored_dimension {
        Some(dimension) if dimension == index.dimension() => {
            println!("  State: {}", style("ready").green());
        }
        Some(dimension) => {
            println!(
                "  State: {} (stored vectors have {} dimensions)",
                style("dimension mismatch").red(),
                dimension
            );
        }
        None => println!("  State: {}", style("missing vector column").red()),
    }
    println!("  Records: {}", count);
    Ok(())
}

async fn transcribe_and_correct(config: &Config, audio_path: &Path) -> Result<()> {
    let transcriber = WhisperClient::new(config)?;
    let raw = transcriber
        .transcribe(audio_path)
        .await
        .at_stage(Stage::Transcription)?;

    if raw.trim().is_empty() {
        return Err(StageError {
            stage: Stage::Transcription,
            source: RagError::EmptyResult("transcription produced no text".to_string()),
        }
        .into());
    }
    println!("raw: {}", raw);

    let embedder = OllamaEmbedder::new(config)?;
    let corrector = OllamaCorrector::new(config)?;
    let index = LanceVectorIndex::connect(config)
        .await
        .at_stage(Stage::Collection)?;

    let pipeline = RagPipeline::new(
        &embedder,
        &index,
        &corrector,
        config.retrieval.correction_limit,
    );
    let correction = pipeline.correct_transcript(&raw).await?;

    print_correction(&correction);
    info!(
        "Corrected transcript with {} and {} context terms",
        corrector.model(),
        correction.context.len()
    );
    Ok(())
}

fn print_search_result(result: &SearchResult) {
    println!(
        "{:.4}  {} — {}",
        result.score, result.term, result.definition
    );
}

fn print_correction(correction: &Correction) {
    println!("context terms:");
    for term in &correction.context {
        println!("  • {} — {}", term.term, term.definition);
    }
    println!("corrected: {}", correction.corrected);
}
