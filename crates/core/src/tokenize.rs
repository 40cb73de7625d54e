/// Text/token conversion used for both index splitting and context
/// windowing. Detokenization only needs to be reversible enough that the
/// extraction model can still locate answer spans in the rebuilt text.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<String>;
    fn detokenize(&self, tokens: &[String]) -> String;
}

/// Word-level tokenizer: splits on whitespace, rejoins with single spaces.
/// Lossless for already-normalized text.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn detokenize(&self, tokens: &[String]) -> String {
        tokens.join(" ")
    }
}
