use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("only PDF files are allowed: {0}")]
    NotPdf(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid splitter config: {0}")]
    InvalidSplitterConfig(String),

    #[error("index serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Error)]
pub enum AskError {
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("index storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt index for {document}: {details}")]
    CorruptIndex { document: String, details: String },

    #[error("answer extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("answer extraction timed out after {0:?}")]
    ExtractionTimeout(std::time::Duration),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid response from {endpoint}: {details}")]
    BackendResponse { endpoint: String, details: String },
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
