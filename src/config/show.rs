use console::style;

use super::Config;

#[inline]
pub fn show_config(config: &Config) {
    eprintln!("{}", style("Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Services:").bold().yellow());
    eprintln!(
        "  Transcription URL: {}",
        style(&config.services.transcription_url).cyan()
    );
    eprintln!("  Ollama URL: {}", style(&config.services.ollama_url).cyan());
    eprintln!("  Vector store: {}", style(config.vector_store_uri()).cyan());
    match config.request_timeout() {
        Some(timeout) => eprintln!("  Request timeout: {}", style(format!("{timeout:?}")).cyan()),
        None => eprintln!("  Request timeout: {}", style("none").dim()),
    }

    eprintln!();
    eprintln!("{}", style("Models:").bold().yellow());
    eprintln!("  Embedding: {}", style(&config.models.embedding).cyan());
    eprintln!(
        "  Embedding dimension: {}",
        style(config.models.embedding_dimension).cyan()
    );
    eprintln!("  Correction: {}", style(&config.models.correction).cyan());

    eprintln!();
    eprintln!("{}", style("Retrieval:").bold().yellow());
    eprintln!("  Collection: {}", style(&config.collection.name).cyan());
    eprintln!(
        "  Search limit: {}",
        style(config.retrieval.search_limit).cyan()
    );
    eprintln!(
        "  Correction limit: {}",
        style(config.retrieval.correction_limit).cyan()
    );

    eprintln!();
    eprintln!("Corpus file: {}", style(config.corpus_path().display()).dim());
    eprintln!("Config file: {}", style(config.config_file_path().display()).dim());
}
