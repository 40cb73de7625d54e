use crate::error::ExtractionError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

/// Extractive question-answering capability: given a question and a context
/// chunk that fits the model's input window, returns the model's single best
/// answer span. Tie-breaking and confidence thresholds are internal to the
/// backing model.
#[async_trait]
pub trait AnswerExtractor {
    async fn extract(&self, question: &str, context: &str) -> Result<String, ExtractionError>;
}

#[derive(Debug, Clone, Serialize)]
struct ExtractionRequest<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct ExtractionResponse {
    answer: String,
}

/// Client for a squad-style QA inference endpoint:
/// `POST {endpoint}` with `{"question", "context"}`, answering
/// `{"answer": "..."}`.
pub struct HttpAnswerExtractor {
    endpoint: Url,
    api_key: Option<String>,
    client: Client,
}

impl HttpAnswerExtractor {
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self, ExtractionError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            api_key,
            client: Client::new(),
        })
    }
}

#[async_trait]
impl AnswerExtractor for HttpAnswerExtractor {
    async fn extract(&self, question: &str, context: &str) -> Result<String, ExtractionError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&ExtractionRequest { question, context });

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(ExtractionError::BackendResponse {
                endpoint: self.endpoint.to_string(),
                details: response.status().to_string(),
            });
        }

        let payload: ExtractionResponse = response.json().await?;
        Ok(payload.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::HttpAnswerExtractor;

    #[test]
    fn extractor_rejects_invalid_endpoint() {
        assert!(HttpAnswerExtractor::new("not a url", None).is_err());
    }

    #[test]
    fn extractor_accepts_http_endpoint() {
        assert!(HttpAnswerExtractor::new("http://localhost:8000/answer", None).is_ok());
    }
}
