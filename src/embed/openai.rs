use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::embed::EmbeddingProvider;
use crate::error::{DedupError, Result};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";

/// Client for an OpenAI-compatible `/embeddings` endpoint.
///
/// Every request is bounded by the timeout given at construction; a timeout
/// is reported as a provider error like any other transport failure.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingProvider {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DedupError::Provider(format!("build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }

    fn transport_error(&self, err: reqwest::Error) -> DedupError {
        if err.is_timeout() {
            DedupError::Provider(format!(
                "embedding request timed out after {}",
                humantime::format_duration(self.timeout)
            ))
        } else {
            DedupError::Provider(format!("embedding request failed: {err}"))
        }
    }
}

fn parse_response(body: &str) -> Result<Vec<f32>> {
    let parsed: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| DedupError::Provider(format!("malformed embedding response: {e}")))?;
    parsed
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| DedupError::Provider("embedding response contained no data".to_string()))
}

impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            input: text,
            model: &self.model,
        };

        tracing::debug!(model = %self.model, chars = text.len(), "requesting embedding");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            tracing::warn!(%status, "embedding provider rejected request");
            return Err(DedupError::Provider(format!(
                "embedding provider returned {status}: {body}"
            )));
        }

        parse_response(&body)
    }
}
