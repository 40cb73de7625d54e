use crate::chunking::{split_into_passages, SplitterConfig};
use crate::embeddings::Embedder;
use crate::error::{AskError, IngestError};
use crate::models::{IndexedPassage, RetrievedFragment, SemanticIndex, INDEX_SCHEMA_VERSION};
use crate::tokenize::Tokenizer;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

impl SemanticIndex {
    /// Builds the semantic index for one document: split the normalized
    /// text into overlapping passages and embed each one.
    pub fn build<T, E>(
        document_id: &str,
        source_filename: &str,
        text: &str,
        tokenizer: &T,
        embedder: &E,
        config: SplitterConfig,
    ) -> Result<Self, IngestError>
    where
        T: Tokenizer + ?Sized,
        E: Embedder + ?Sized,
    {
        let passages = split_into_passages(tokenizer, text, config)?
            .into_iter()
            .enumerate()
            .map(|(position, passage)| {
                let position = position as u64;
                IndexedPassage {
                    passage_id: make_passage_id(document_id, position, &passage),
                    position,
                    embedding: embedder.embed(&passage),
                    text: passage,
                }
            })
            .collect();

        Ok(Self {
            schema_version: INDEX_SCHEMA_VERSION,
            document_id: document_id.to_string(),
            source_filename: source_filename.to_string(),
            embedding_dimensions: embedder.dimensions(),
            indexed_at: Utc::now(),
            passages,
        })
    }

    /// Returns up to `top_k` fragments ranked by cosine similarity to the
    /// question vector, best first. Embeddings are unit-length, so the dot
    /// product is the cosine score. Ties keep passage order, which keeps
    /// downstream chunking deterministic.
    pub fn retrieve(&self, question_vector: &[f32], top_k: usize) -> Vec<RetrievedFragment> {
        let mut scored: Vec<(f32, &IndexedPassage)> = self
            .passages
            .iter()
            .map(|passage| (dot(question_vector, &passage.embedding), passage))
            .collect();

        scored.sort_by(|left, right| right.0.total_cmp(&left.0));

        scored
            .into_iter()
            .take(top_k)
            .map(|(score, passage)| RetrievedFragment {
                text: passage.text.clone(),
                score,
            })
            .collect()
    }
}

fn dot(left: &[f32], right: &[f32]) -> f32 {
    left.iter().zip(right).map(|(a, b)| a * b).sum()
}

fn make_passage_id(document_id: &str, position: u64, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_id.as_bytes());
    hasher.update(position.to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// On-disk index storage. Each document gets its own `{stem}_index`
/// directory holding a single `index.json`; the write goes through a
/// temporary file and a rename so a failed upload never leaves a
/// partially-readable index behind. Reads never mutate, so concurrent
/// questions against the same document need no coordination.
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn index_dir(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{stem}_index"))
    }

    pub fn exists(&self, stem: &str) -> bool {
        self.index_dir(stem).join("index.json").is_file()
    }

    pub fn save(&self, stem: &str, index: &SemanticIndex) -> Result<(), IngestError> {
        let dir = self.index_dir(stem);
        fs::create_dir_all(&dir)?;

        let body = serde_json::to_vec(index)?;
        let staged = dir.join("index.json.tmp");
        fs::write(&staged, body)?;
        fs::rename(&staged, dir.join("index.json"))?;
        Ok(())
    }

    /// Loads a document's index. An absent index is `DocumentNotFound`;
    /// unreadable JSON is a storage failure, never an empty index.
    pub fn load(&self, stem: &str) -> Result<SemanticIndex, AskError> {
        let path = self.index_dir(stem).join("index.json");
        if !path.is_file() {
            return Err(AskError::DocumentNotFound(stem.to_string()));
        }

        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes).map_err(|error| AskError::CorruptIndex {
            document: stem.to_string(),
            details: error.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
