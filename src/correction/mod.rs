// Correction module
// Rewrites a transcript so misheard jargon matches the retrieved glossary terms

pub mod ollama;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use std::fmt::Write as _;

use crate::Result;
use crate::database::SearchResult;

pub use ollama::OllamaCorrector;

const CORRECTION_INSTRUCTIONS: &str = "Fix misheard technical terms in this transcript. \
Only substitute terms from the reference list below. \
Return only the corrected text, with no commentary.";

/// A glossary term handed to the correction model as grounding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingTerm {
    pub name: String,
    pub definition: String,
}

impl From<&SearchResult> for GroundingTerm {
    #[inline]
    fn from(result: &SearchResult) -> Self {
        Self {
            name: result.term.clone(),
            definition: result.definition.clone(),
        }
    }
}

/// Anything that can correct a transcript given ordered grounding terms
#[async_trait]
pub trait Corrector: Send + Sync {
    async fn correct(&self, transcript: &str, terms: &[GroundingTerm]) -> Result<String>;
}

/// Build the system instruction, one bullet per term in the order given
#[inline]
pub fn build_system_prompt(terms: &[GroundingTerm]) -> String {
    let mut prompt = String::from(CORRECTION_INSTRUCTIONS);
    prompt.push_str("\n\nReference terms:\n");
    for term in terms {
        // Writing to a String cannot fail
        let _ = writeln!(prompt, "- {}: {}", term.name, term.definition);
    }
    prompt
}
