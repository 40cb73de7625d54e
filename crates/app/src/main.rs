mod server;

use clap::{Parser, Subcommand};
use pdf_qa_core::{
    ingest_folder_best_effort, HashedTrigramEmbedder, HttpAnswerExtractor, IndexStore,
    LopdfTextSource, QaService, SplitterConfig, WhitespaceTokenizer,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-qa-server", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory where uploaded PDFs are stored
    #[arg(long, default_value = "uploads")]
    upload_dir: String,

    /// Directory where per-document indexes are persisted
    #[arg(long, default_value = "indexes")]
    index_dir: String,

    /// Extractive QA inference endpoint
    #[arg(long, default_value = "http://localhost:8000/answer")]
    qa_endpoint: String,

    /// Bearer token for the QA endpoint
    #[arg(long, env = "QA_API_KEY")]
    qa_api_key: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (upload + ask).
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,

        /// Browser origin allowed by CORS; all origins when omitted.
        #[arg(long, env = "FRONTEND_URL")]
        frontend_origin: Option<String>,
    },
    /// Index every PDF under a folder, recursively.
    Ingest {
        #[arg(long)]
        folder: String,
    },
    /// Ask one question about an uploaded document and print the answer.
    Ask {
        /// Filename used at upload time
        #[arg(long)]
        file: String,

        #[arg(long)]
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let Cli {
        command,
        upload_dir,
        index_dir,
        qa_endpoint,
        qa_api_key,
    } = Cli::parse();

    match command {
        Command::Serve {
            bind,
            frontend_origin,
        } => {
            let service = Arc::new(build_service(
                &upload_dir,
                &index_dir,
                &qa_endpoint,
                qa_api_key,
            )?);
            info!(version = env!("CARGO_PKG_VERSION"), "pdf-qa boot");
            server::run_server(service, &bind, frontend_origin).await?;
        }
        Command::Ingest { folder } => {
            let store = IndexStore::new(&index_dir);
            let report = ingest_folder_best_effort(
                Path::new(&folder),
                Path::new(&upload_dir),
                &store,
                &LopdfTextSource,
                &WhitespaceTokenizer,
                &HashedTrigramEmbedder::default(),
                SplitterConfig::default(),
            )?;

            for skipped in &report.skipped_files {
                warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped pdf");
            }

            for receipt in &report.receipts {
                println!(
                    "indexed {} ({} passages)",
                    receipt.filename, receipt.passage_count
                );
            }
            println!(
                "{} documents indexed, {} skipped",
                report.receipts.len(),
                report.skipped_files.len()
            );
        }
        Command::Ask { file, question } => {
            let service = build_service(&upload_dir, &index_dir, &qa_endpoint, qa_api_key)?;
            let outcome = service.ask(&file, &question).await?;
            println!("{}", outcome.into_answer_text());
        }
    }

    Ok(())
}

fn build_service(
    upload_dir: &str,
    index_dir: &str,
    qa_endpoint: &str,
    qa_api_key: Option<String>,
) -> anyhow::Result<server::Service> {
    let extractor = HttpAnswerExtractor::new(qa_endpoint, qa_api_key)?;
    Ok(QaService::new(
        IndexStore::new(index_dir),
        upload_dir,
        Box::new(LopdfTextSource),
        HashedTrigramEmbedder::default(),
        WhitespaceTokenizer,
        extractor,
    ))
}
