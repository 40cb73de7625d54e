use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bumped whenever the persisted index layout changes shape.
pub const INDEX_SCHEMA_VERSION: u32 = 1;

/// Number of fragments retrieved per question.
pub const TOP_K: usize = 10;

/// Token window fed to the extraction model per call.
pub const MAX_CONTEXT_TOKENS: usize = 512;

/// Hard cap on the combined answer, in characters.
pub const MAX_ANSWER_CHARS: usize = 200;

/// Fixed response when retrieval yields nothing usable.
pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReceipt {
    pub receipt_id: Uuid,
    pub document_id: String,
    pub filename: String,
    pub source_filename: String,
    pub checksum: String,
    pub passage_count: usize,
    pub indexed_at: DateTime<Utc>,
}

/// One embedded span of document text inside a persisted index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPassage {
    pub passage_id: String,
    pub position: u64,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// The persisted semantic representation of a single document.
///
/// Stored as `index.json` inside the `{stem}_index` directory. Correspondence
/// between a document and its index is purely the directory naming
/// convention; `source_filename` is recorded so a sanitization collision is
/// at least visible after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticIndex {
    pub schema_version: u32,
    pub document_id: String,
    pub source_filename: String,
    pub embedding_dimensions: usize,
    pub indexed_at: DateTime<Utc>,
    pub passages: Vec<IndexedPassage>,
}

/// A retrieval hit. Rank is implicit in vector order, best first.
#[derive(Debug, Clone)]
pub struct RetrievedFragment {
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    Answer(String),
    NoRelevantInformation,
}

impl AskOutcome {
    /// Collapses the outcome into the response text sent to clients.
    pub fn into_answer_text(self) -> String {
        match self {
            AskOutcome::Answer(text) => text,
            AskOutcome::NoRelevantInformation => NO_RELEVANT_INFORMATION.to_string(),
        }
    }
}
