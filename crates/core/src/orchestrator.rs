use crate::chunking::{window_context, SplitterConfig};
use crate::embeddings::Embedder;
use crate::error::{AskError, IngestError};
use crate::extractor::PdfTextSource;
use crate::index::IndexStore;
use crate::ingest::{document_stem, index_pdf_bytes, sanitize_filename};
use crate::models::{
    AskOutcome, DocumentReceipt, MAX_ANSWER_CHARS, MAX_CONTEXT_TOKENS, TOP_K,
};
use crate::qa::AnswerExtractor;
use crate::tokenize::Tokenizer;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Clone, Copy)]
pub struct AskOptions {
    pub top_k: usize,
    pub max_context_tokens: usize,
    pub max_answer_chars: usize,
    pub extraction_timeout: Duration,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            top_k: TOP_K,
            max_context_tokens: MAX_CONTEXT_TOKENS,
            max_answer_chars: MAX_ANSWER_CHARS,
            extraction_timeout: Duration::from_secs(30),
        }
    }
}

/// The orchestration layer for both request paths, constructed once at
/// process start with its capability implementations and shared read-only
/// across requests.
///
/// Write path: upload -> normalize -> index -> persist.
/// Read path: ask -> load index -> retrieve -> window context -> extract
/// per window -> aggregate -> truncate.
pub struct QaService<E, T, X>
where
    E: Embedder,
    T: Tokenizer,
    X: AnswerExtractor,
{
    store: IndexStore,
    upload_dir: PathBuf,
    pdf: Box<dyn PdfTextSource + Send + Sync>,
    embedder: E,
    tokenizer: T,
    extractor: X,
    splitter: SplitterConfig,
    options: AskOptions,
}

impl<E, T, X> QaService<E, T, X>
where
    E: Embedder + Send + Sync,
    T: Tokenizer + Send + Sync,
    X: AnswerExtractor + Send + Sync,
{
    pub fn new(
        store: IndexStore,
        upload_dir: impl Into<PathBuf>,
        pdf: Box<dyn PdfTextSource + Send + Sync>,
        embedder: E,
        tokenizer: T,
        extractor: X,
    ) -> Self {
        Self {
            store,
            upload_dir: upload_dir.into(),
            pdf,
            embedder,
            tokenizer,
            extractor,
            splitter: SplitterConfig::default(),
            options: AskOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AskOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_splitter(mut self, splitter: SplitterConfig) -> Self {
        self.splitter = splitter;
        self
    }

    /// Ingests one uploaded PDF and persists its index. Blocking; callers
    /// on an async runtime should run it on a blocking thread.
    pub fn upload(&self, filename: &str, bytes: &[u8]) -> Result<DocumentReceipt, IngestError> {
        index_pdf_bytes(
            filename,
            bytes,
            &self.upload_dir,
            &self.store,
            self.pdf.as_ref(),
            &self.tokenizer,
            &self.embedder,
            self.splitter,
        )
    }

    /// Answers a question against a previously uploaded document.
    ///
    /// Retrieved fragments are joined with single spaces and re-windowed to
    /// the extraction model's input budget; the model runs once per window,
    /// strictly in window order, because the final truncation depends on
    /// concatenation order. Any capability failure fails the whole request;
    /// there is no partial-answer fallback.
    pub async fn ask(&self, filename: &str, question: &str) -> Result<AskOutcome, AskError> {
        let sanitized = sanitize_filename(filename);
        let stem = document_stem(&sanitized)
            .map_err(|_| AskError::DocumentNotFound(filename.to_string()))?;

        let index = self.store.load(&stem)?;

        let question_vector = self.embedder.embed(question);
        let fragments = index.retrieve(&question_vector, self.options.top_k);
        if fragments.is_empty() {
            return Ok(AskOutcome::NoRelevantInformation);
        }

        let context = fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let windows = window_context(&self.tokenizer, &context, self.options.max_context_tokens);
        if windows.is_empty() {
            return Ok(AskOutcome::NoRelevantInformation);
        }

        let mut answers = Vec::with_capacity(windows.len());
        for window in &windows {
            let extraction = timeout(
                self.options.extraction_timeout,
                self.extractor.extract(question, window),
            )
            .await;

            match extraction {
                Ok(answer) => answers.push(answer?),
                Err(_) => {
                    return Err(AskError::ExtractionTimeout(self.options.extraction_timeout))
                }
            }
        }

        let combined = answers.join(" ");
        let truncated: String = combined.chars().take(self.options.max_answer_chars).collect();
        Ok(AskOutcome::Answer(truncated))
    }
}
