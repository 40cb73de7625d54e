use crate::chunking::{normalize_whitespace, SplitterConfig};
use crate::embeddings::Embedder;
use crate::error::IngestError;
use crate::extractor::{join_pages, PdfTextSource};
use crate::index::IndexStore;
use crate::models::{DocumentReceipt, SemanticIndex};
use crate::tokenize::Tokenizer;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

/// Replaces spaces with hyphens. Applied to every filename before it is
/// used as a storage or index key; idempotent by construction.
pub fn sanitize_filename(filename: &str) -> String {
    filename.replace(' ', "-")
}

pub fn is_pdf_filename(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// The filename without its final extension, used as the index key.
pub fn document_stem(filename: &str) -> Result<String, IngestError> {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| IngestError::MissingFileName(filename.to_string()))
}

fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn document_id_for(sanitized_filename: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sanitized_filename.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The full write path for one uploaded document: validate the filename,
/// persist the raw PDF under the upload directory, extract and normalize
/// its text, then build and persist the semantic index.
///
/// The filename check happens before anything touches disk; a non-PDF
/// upload leaves no trace.
#[allow(clippy::too_many_arguments)]
pub fn index_pdf_bytes<T, E>(
    filename: &str,
    bytes: &[u8],
    upload_dir: &Path,
    store: &IndexStore,
    pdf: &dyn PdfTextSource,
    tokenizer: &T,
    embedder: &E,
    config: SplitterConfig,
) -> Result<DocumentReceipt, IngestError>
where
    T: Tokenizer + ?Sized,
    E: Embedder + ?Sized,
{
    if !is_pdf_filename(filename) {
        return Err(IngestError::NotPdf(filename.to_string()));
    }

    let sanitized = sanitize_filename(filename);
    let stem = document_stem(&sanitized)?;

    fs::create_dir_all(upload_dir)?;
    let stored_path = upload_dir.join(&sanitized);
    fs::write(&stored_path, bytes)?;

    let pages = pdf.extract_pages(&stored_path)?;
    let text = normalize_whitespace(&join_pages(&pages));

    let document_id = document_id_for(&sanitized);
    let index = SemanticIndex::build(&document_id, filename, &text, tokenizer, embedder, config)?;
    store.save(&stem, &index)?;

    Ok(DocumentReceipt {
        receipt_id: Uuid::new_v4(),
        document_id,
        filename: sanitized,
        source_filename: filename.to_string(),
        checksum: digest_bytes(bytes),
        passage_count: index.passages.len(),
        indexed_at: Utc::now(),
    })
}

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(is_pdf_filename)
        {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

pub struct IngestionReport {
    pub receipts: Vec<DocumentReceipt>,
    pub skipped_files: Vec<SkippedPdf>,
}

/// Batch ingestion for a folder of PDFs. Unreadable files are skipped and
/// reported rather than failing the whole run.
#[allow(clippy::too_many_arguments)]
pub fn ingest_folder_best_effort<T, E>(
    folder: &Path,
    upload_dir: &Path,
    store: &IndexStore,
    pdf: &dyn PdfTextSource,
    tokenizer: &T,
    embedder: &E,
    config: SplitterConfig,
) -> Result<IngestionReport, IngestError>
where
    T: Tokenizer + ?Sized,
    E: Embedder + ?Sized,
{
    let files = discover_pdf_files(folder);

    if files.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "no pdf files found in {}",
            folder.display()
        )));
    }

    let mut receipts = Vec::new();
    let mut skipped_files = Vec::new();

    for path in files {
        let outcome = (|| {
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?;
            let bytes = fs::read(&path)?;
            index_pdf_bytes(
                filename, &bytes, upload_dir, store, pdf, tokenizer, embedder, config,
            )
        })();

        match outcome {
            Ok(receipt) => receipts.push(receipt),
            Err(error) => skipped_files.push(SkippedPdf {
                path,
                reason: error.to_string(),
            }),
        }
    }

    Ok(IngestionReport {
        receipts,
        skipped_files,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        discover_pdf_files, document_stem, index_pdf_bytes, ingest_folder_best_effort,
        is_pdf_filename, sanitize_filename,
    };
    use crate::chunking::SplitterConfig;
    use crate::embeddings::HashedTrigramEmbedder;
    use crate::error::IngestError;
    use crate::extractor::{PageText, PdfTextSource};
    use crate::index::IndexStore;
    use crate::tokenize::WhitespaceTokenizer;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;

    struct FixedTextSource(&'static str);

    impl PdfTextSource for FixedTextSource {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<PageText>, IngestError> {
            Ok(vec![PageText {
                number: 1,
                text: self.0.to_string(),
            }])
        }
    }

    #[test]
    fn sanitization_replaces_spaces_and_is_idempotent() {
        assert_eq!(sanitize_filename("my file.pdf"), "my-file.pdf");
        assert_eq!(sanitize_filename("my-file.pdf"), "my-file.pdf");
        assert_eq!(
            sanitize_filename(&sanitize_filename("a b c.pdf")),
            "a-b-c.pdf"
        );
    }

    #[test]
    fn pdf_filename_check_is_case_insensitive() {
        assert!(is_pdf_filename("report.pdf"));
        assert!(is_pdf_filename("REPORT.PDF"));
        assert!(!is_pdf_filename("notes.txt"));
        assert!(!is_pdf_filename("pdf"));
    }

    #[test]
    fn stem_strips_only_final_extension() {
        assert_eq!(document_stem("report.pdf").unwrap(), "report");
        assert_eq!(document_stem("v1.2-spec.pdf").unwrap(), "v1.2-spec");
        assert!(document_stem("").is_err());
    }

    #[test]
    fn non_pdf_upload_is_rejected_before_any_write() {
        let dir = tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        let store = IndexStore::new(dir.path().join("indexes"));

        let result = index_pdf_bytes(
            "notes.txt",
            b"plain text",
            &uploads,
            &store,
            &FixedTextSource("irrelevant"),
            &WhitespaceTokenizer,
            &HashedTrigramEmbedder::default(),
            SplitterConfig::default(),
        );

        assert!(matches!(result, Err(IngestError::NotPdf(_))));
        assert!(!uploads.exists());
        assert!(!dir.path().join("indexes").exists());
    }

    #[test]
    fn upload_persists_raw_file_and_index() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        let store = IndexStore::new(dir.path().join("indexes"));

        let receipt = index_pdf_bytes(
            "site manual.pdf",
            b"%PDF-1.4 fake body",
            &uploads,
            &store,
            &FixedTextSource("the relief valve opens at forty bar"),
            &WhitespaceTokenizer,
            &HashedTrigramEmbedder::default(),
            SplitterConfig::default(),
        )?;

        assert_eq!(receipt.filename, "site-manual.pdf");
        assert_eq!(receipt.source_filename, "site manual.pdf");
        assert!(receipt.passage_count > 0);
        assert!(uploads.join("site-manual.pdf").is_file());
        assert!(store.exists("site-manual"));
        Ok(())
    }

    #[test]
    fn discover_pdf_files_is_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let nested = dir.path().join("nested");
        fs::create_dir(&nested)?;

        File::create(dir.path().join("a.pdf"))
            .and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(nested.join("b.pdf"))
            .and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(dir.path().join("skip.txt")).and_then(|mut file| file.write_all(b"no"))?;

        assert_eq!(discover_pdf_files(dir.path()).len(), 2);
        Ok(())
    }

    #[test]
    fn folder_ingestion_fails_without_pdfs() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("indexes"));
        let result = ingest_folder_best_effort(
            dir.path(),
            &dir.path().join("uploads"),
            &store,
            &FixedTextSource("text"),
            &WhitespaceTokenizer,
            &HashedTrigramEmbedder::default(),
            SplitterConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn folder_ingestion_reports_each_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("ok.pdf"), b"%PDF-1.4 body")?;

        let store = IndexStore::new(dir.path().join("indexes"));
        let report = ingest_folder_best_effort(
            dir.path(),
            &dir.path().join("uploads"),
            &store,
            &FixedTextSource("pump pressure forty bar"),
            &WhitespaceTokenizer,
            &HashedTrigramEmbedder::default(),
            SplitterConfig::default(),
        )?;

        assert_eq!(report.receipts.len(), 1);
        assert!(report.skipped_files.is_empty());
        assert!(store.exists("ok"));
        Ok(())
    }
}
