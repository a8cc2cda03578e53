//! Core domain types shared by every ResumeForge crate
//!
//! - Source documents and the chunks derived from them
//! - Retrieval hits returned by the embedding index
//! - Structured judgments produced by the reviewer and supervisor

use serde::{Deserialize, Serialize};
use std::fmt;

/// A loaded source document (one per input file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier of the document, usually its file path
    pub source: String,

    /// Extracted plain text
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// A bounded span of a document's text, the unit of indexing and retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// `{source}::chunk::{ordinal}`
    pub chunk_id: String,

    /// Source document identifier
    pub source: String,

    /// Chunk content
    pub text: String,
}

impl Chunk {
    /// Build a chunk whose id is derived from its source and ordinal
    pub fn new(source: &str, ordinal: usize, text: impl Into<String>) -> Self {
        Self {
            chunk_id: Self::make_id(source, ordinal),
            source: source.to_string(),
            text: text.into(),
        }
    }

    pub fn make_id(source: &str, ordinal: usize) -> String {
        format!("{}::chunk::{}", source, ordinal)
    }
}

/// A chunk paired with its cosine similarity to a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub chunk: Chunk,
    pub score: f32,
}

/// Accept/revise verdict emitted by the reviewer and supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Accept,
    Revise,
}

impl Verdict {
    /// Coerce free-form model output into a verdict.
    ///
    /// Only `accept` and `revise` (case-insensitive, surrounding whitespace ignored)
    /// are recognised. Everything else is treated as `Revise`.
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "accept" => Verdict::Accept,
            _ => Verdict::Revise,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accept => "accept",
            Verdict::Revise => "revise",
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured critique of one draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFeedback {
    pub decision: Verdict,

    /// Quality score, always within `[0, 10]`
    pub score: f64,

    pub strengths: Vec<String>,
    pub risks: Vec<String>,

    /// Ordered list of concrete edits the reviewer asks for
    pub edits: Vec<String>,

    pub summary: String,

    /// Verbatim model output the feedback was parsed from
    pub raw_text: String,
}

/// Supervisor ruling for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorDecision {
    pub action: Verdict,
    pub reason: String,

    /// Items the next revision should concentrate on
    pub focus: Vec<String>,

    /// Verbatim model output the decision was parsed from
    pub raw_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_format() {
        let chunk = Chunk::new("notes/cv.md", 3, "Rust, Go");
        assert_eq!(chunk.chunk_id, "notes/cv.md::chunk::3");
        assert_eq!(chunk.source, "notes/cv.md");
    }

    #[test]
    fn test_verdict_coercion() {
        assert_eq!(Verdict::coerce("accept"), Verdict::Accept);
        assert_eq!(Verdict::coerce("  ACCEPT \n"), Verdict::Accept);
        assert_eq!(Verdict::coerce("revise"), Verdict::Revise);
        assert_eq!(Verdict::coerce("maybe"), Verdict::Revise);
        assert_eq!(Verdict::coerce(""), Verdict::Revise);
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        let json = serde_json::to_string(&Verdict::Accept).unwrap();
        assert_eq!(json, "\"accept\"");
        let back: Verdict = serde_json::from_str("\"revise\"").unwrap();
        assert_eq!(back, Verdict::Revise);
    }
}
