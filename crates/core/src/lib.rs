pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod qa;
pub mod tokenize;

pub use chunking::{normalize_whitespace, split_into_passages, window_context, SplitterConfig};
pub use embeddings::{Embedder, HashedTrigramEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{AskError, ExtractionError, IngestError};
pub use extractor::{join_pages, LopdfTextSource, PageText, PdfTextSource};
pub use index::IndexStore;
pub use ingest::{
    discover_pdf_files, document_stem, index_pdf_bytes, ingest_folder_best_effort,
    is_pdf_filename, sanitize_filename, IngestionReport, SkippedPdf,
};
pub use models::{
    AskOutcome, DocumentReceipt, IndexedPassage, RetrievedFragment, SemanticIndex,
    MAX_ANSWER_CHARS, MAX_CONTEXT_TOKENS, NO_RELEVANT_INFORMATION, TOP_K,
};
pub use orchestrator::{AskOptions, QaService};
pub use qa::{AnswerExtractor, HttpAnswerExtractor};
pub use tokenize::{Tokenizer, WhitespaceTokenizer};
