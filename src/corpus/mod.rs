// Glossary corpus loading
// The corpus is a JSON array of {"term", "definition"} objects; its order fixes the record ids

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A single glossary entry as it appears in the corpus file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub term: String,
    pub definition: String,
}

impl CorpusEntry {
    #[inline]
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }

    /// Text that gets embedded for this entry: `term: definition`
    #[inline]
    pub fn embedding_text(&self) -> String {
        format!("{}: {}", self.term, self.definition)
    }
}

#[inline]
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<CorpusEntry>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;

    let entries = parse_corpus(&content)
        .with_context(|| format!("Failed to parse corpus file: {}", path.display()))?;

    debug!("Loaded {} corpus entries from {}", entries.len(), path.display());
    Ok(entries)
}

#[inline]
pub fn parse_corpus(content: &str) -> Result<Vec<CorpusEntry>> {
    Ok(serde_json::from_str(content)?)
}
