use crate::error::IngestError;
use crate::tokenize::Tokenizer;

/// Collapses all whitespace runs (newlines, tabs, NBSP) to single spaces.
/// Applied once to extracted document text before indexing.
pub fn normalize_whitespace(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Token-window settings for the write path: how document text is sliced
/// into overlapping passages before embedding.
#[derive(Debug, Clone, Copy)]
pub struct SplitterConfig {
    pub passage_tokens: usize,
    pub overlap_tokens: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            passage_tokens: 500,
            overlap_tokens: 50,
        }
    }
}

/// Slices document text into overlapping token windows for indexing.
/// Overlap keeps answer spans near a boundary intact in at least one passage.
pub fn split_into_passages<T: Tokenizer + ?Sized>(
    tokenizer: &T,
    text: &str,
    config: SplitterConfig,
) -> Result<Vec<String>, IngestError> {
    if config.passage_tokens == 0 {
        return Err(IngestError::InvalidSplitterConfig(
            "passage_tokens must be positive".to_string(),
        ));
    }
    if config.overlap_tokens >= config.passage_tokens {
        return Err(IngestError::InvalidSplitterConfig(format!(
            "overlap {} must be smaller than passage size {}",
            config.overlap_tokens, config.passage_tokens
        )));
    }

    let tokens = tokenizer.tokenize(text);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let stride = config.passage_tokens - config.overlap_tokens;
    let mut passages = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + config.passage_tokens).min(tokens.len());
        passages.push(tokenizer.detokenize(&tokens[start..end]));
        if end == tokens.len() {
            break;
        }
        start += stride;
    }

    Ok(passages)
}

/// Partitions retrieved context into non-overlapping token windows of at
/// most `max_tokens`, each detokenized back to text for the extraction
/// model. Windows advance by exactly `max_tokens`; an input that is an exact
/// multiple produces no empty trailing window, and empty input produces no
/// windows at all.
pub fn window_context<T: Tokenizer + ?Sized>(
    tokenizer: &T,
    context: &str,
    max_tokens: usize,
) -> Vec<String> {
    let mut tokens = tokenizer.tokenize(context);
    let mut windows = Vec::new();

    if max_tokens == 0 {
        return windows;
    }

    while tokens.len() > max_tokens {
        let head: Vec<String> = tokens.drain(..max_tokens).collect();
        windows.push(tokenizer.detokenize(&head));
    }

    if !tokens.is_empty() {
        windows.push(tokenizer.detokenize(&tokens));
    }

    windows
}
