use super::{Device, Encoder};
use crate::error::{EvalError, Result};
use crate::eval::EmbeddingMatrix;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request structure for the embeddings API (token-array input form)
#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a [u32]>,
    encoding_format: &'static str,
}

/// Response structure from the embeddings API
#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

/// Individual embedding data in API response
#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible `/embeddings` endpoint
///
/// Sends token ids rather than text so the server embeds exactly the sequences
/// the local tokenizer produced. The API has no attention mask, so trailing
/// padding is stripped before sending.
pub struct HttpEncoder {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    pad_token_id: u32,
    device: Device,
}

impl HttpEncoder {
    /// Create a new HTTP encoder
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. "https://api.openai.com/v1"
    /// * `model` - Model name passed through to the server
    /// * `api_key` - Bearer token, if the server needs one
    /// * `pad_token_id` - Padding id to strip from the end of each sequence
    /// * `device` - Device the server-side model is placed on
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: &str,
        model: String,
        api_key: Option<String>,
        pad_token_id: u32,
        device: Device,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EvalError::Embedding(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key,
            model,
            pad_token_id,
            device,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Drop trailing padding, keeping at least one token
    fn strip_padding<'a>(&self, ids: &'a [u32]) -> &'a [u32] {
        let end = ids
            .iter()
            .rposition(|&id| id != self.pad_token_id)
            .map(|pos| pos + 1)
            .unwrap_or(1)
            .min(ids.len());
        &ids[..end]
    }
}

#[async_trait]
impl Encoder for HttpEncoder {
    async fn encode(&self, input_ids: &[Vec<u32>]) -> Result<EmbeddingMatrix> {
        if input_ids.is_empty() {
            return Ok(EmbeddingMatrix::default());
        }

        let start = std::time::Instant::now();
        let request = EmbeddingRequest {
            model: &self.model,
            input: input_ids.iter().map(|ids| self.strip_padding(ids)).collect(),
            encoding_format: "float",
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EvalError::Embedding(format!("Network error: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(EvalError::Embedding(format!(
                "Embedding API error {}: {}",
                status, body
            )));
        }

        let mut result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EvalError::Embedding(format!("Failed to parse response: {}", e)))?;

        if result.data.len() != input_ids.len() {
            return Err(EvalError::Embedding(format!(
                "Expected {} embeddings, got {}",
                input_ids.len(),
                result.data.len()
            )));
        }

        // Servers are allowed to return entries out of order
        result.data.sort_by_key(|d| d.index);

        log::debug!(
            "Embedded {} sequences in {:?}",
            input_ids.len(),
            start.elapsed()
        );

        EmbeddingMatrix::from_rows(result.data.into_iter().map(|d| d.embedding).collect())
    }

    fn device(&self) -> Device {
        self.device
    }
}
