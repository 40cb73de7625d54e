use axum::{
    extract::{Multipart, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use pdf_qa_core::{
    AskError, HashedTrigramEmbedder, HttpAnswerExtractor, IngestError, QaService,
    WhitespaceTokenizer,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub type Service = QaService<HashedTrigramEmbedder, WhitespaceTokenizer, HttpAnswerExtractor>;

/// Starts the HTTP API: `POST /upload`, `POST /ask`, `GET /health`.
///
/// The service object is built once by the caller and shared read-only
/// across all requests; persisted indexes are the only cross-request state.
pub async fn run_server(
    service: Arc<Service>,
    bind: &str,
    frontend_origin: Option<String>,
) -> anyhow::Result<()> {
    let cors = match &frontend_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/upload", post(handle_upload))
        .route("/ask", post(handle_ask))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(service);

    info!(bind = %bind, "pdf-qa server listening");
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn timeout_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::REQUEST_TIMEOUT,
        code: "timeout".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

fn map_ingest_error(error: IngestError) -> AppError {
    match error {
        IngestError::NotPdf(_) => bad_request("Only PDF files are allowed"),
        other => internal(other.to_string()),
    }
}

fn map_ask_error(error: AskError) -> AppError {
    match error {
        AskError::DocumentNotFound(_) => not_found("Document not found"),
        AskError::ExtractionTimeout(_) => timeout_error(error.to_string()),
        other => internal(other.to_string()),
    }
}

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    document_id: String,
    filename: String,
    passage_count: usize,
    indexed_at: DateTime<Utc>,
}

/// `POST /upload` — multipart form with a `file` field carrying the PDF.
/// Rejected before any write when the filename is not `.pdf`; indexing runs
/// on a blocking thread because PDF parsing and embedding are CPU-bound.
async fn handle_upload(
    State(service): State<Arc<Service>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| bad_request(error.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| bad_request("file field has no filename"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|error| bad_request(error.to_string()))?;

        let worker = service.clone();
        let receipt = tokio::task::spawn_blocking(move || worker.upload(&filename, &bytes))
            .await
            .map_err(|error| internal(error.to_string()))?
            .map_err(map_ingest_error)?;

        info!(
            document_id = %receipt.document_id,
            filename = %receipt.filename,
            passages = receipt.passage_count,
            "document indexed"
        );

        return Ok(Json(UploadResponse {
            message: "File processed successfully".to_string(),
            document_id: receipt.document_id,
            filename: receipt.filename,
            passage_count: receipt.passage_count,
            indexed_at: receipt.indexed_at,
        }));
    }

    Err(bad_request("multipart body has no file field"))
}

#[derive(Deserialize)]
struct AskRequest {
    filename: String,
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
}

/// `POST /ask` — JSON `{"filename", "question"}`. Answers with
/// `{"answer": ...}`; an unknown filename is a 404, and a retrieval that
/// finds nothing answers with the fixed sentinel text.
async fn handle_ask(
    State(service): State<Arc<Service>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let outcome = service
        .ask(&request.filename, &request.question)
        .await
        .map_err(map_ask_error)?;

    Ok(Json(AskResponse {
        answer: outcome.into_answer_text(),
    }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
