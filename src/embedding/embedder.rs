//! Sentence embedding adapter
//!
//! The attribution engine depends on the [`SentenceEmbedder`] trait; the
//! production implementation calls the Ollama embeddings endpoint.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Error types for embedding operations
#[derive(Debug, Clone)]
pub enum EmbeddingError {
    /// Embedding server not reachable
    ProviderUnavailable(String),
    /// Request failed (HTTP error, invalid response)
    RequestFailed(String),
    /// The server returned fewer vectors than inputs
    EmptyResponse,
    /// Two vectors disagree on dimension
    DimensionMismatch { left: usize, right: usize },
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingError::ProviderUnavailable(msg) => {
                write!(f, "Embedding provider unavailable: {}", msg)
            }
            EmbeddingError::RequestFailed(msg) => write!(f, "Embedding request failed: {}", msg),
            EmbeddingError::EmptyResponse => write!(f, "Embedding response missing vectors"),
            EmbeddingError::DimensionMismatch { left, right } => {
                write!(f, "Embedding dimension mismatch: {} vs {}", left, right)
            }
        }
    }
}

impl std::error::Error for EmbeddingError {}

/// The contract all sentence embedders implement.
#[async_trait]
pub trait SentenceEmbedder: Send + Sync {
    /// Name of the backing embedder (e.g. "ollama", "mock")
    fn embedder_name(&self) -> &'static str;

    /// Embed a batch of sentences; one vector per input, in input order.
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single sentence.
    async fn embed(&self, input: &str) -> Result<Vec<f32>, EmbeddingError> {
        let inputs = vec![input.to_string()];
        let mut vectors = self.embed_batch(&inputs).await?;
        vectors.pop().ok_or(EmbeddingError::EmptyResponse)
    }
}

/// Cosine similarity between two vectors.
///
/// Mismatched dimensions are an error, not a silent truncation; a zero
/// vector has similarity 0.0 with everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Ollama embeddings request format (POST /api/embed)
#[derive(Debug, Serialize)]
struct OllamaEmbedRequest {
    model: String,
    input: Vec<String>,
}

/// Ollama embeddings response
#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Ollama embedder configuration
#[derive(Debug, Clone)]
pub struct OllamaEmbedderConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaEmbedderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Sentence embedder backed by an Ollama server.
pub struct OllamaEmbedder {
    config: OllamaEmbedderConfig,
    client: Client,
}

impl OllamaEmbedder {
    pub fn new(config: OllamaEmbedderConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl SentenceEmbedder for OllamaEmbedder {
    fn embedder_name(&self) -> &'static str {
        "ollama"
    }

    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.config.base_url);
        let request = OllamaEmbedRequest {
            model: self.config.model.clone(),
            input: inputs.to_vec(),
        };

        log::debug!("Embedding {} inputs with '{}'", inputs.len(), self.config.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                EmbeddingError::ProviderUnavailable(format!("Cannot connect to Ollama: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::RequestFailed(format!(
                "Ollama returned error: {}",
                error_text
            )));
        }

        let embed_response: OllamaEmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::RequestFailed(format!("Invalid response: {}", e)))?;

        if embed_response.embeddings.len() != inputs.len() {
            return Err(EmbeddingError::EmptyResponse);
        }

        Ok(embed_response.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_of_identical_vectors_is_one() {
        let v = vec![0.5, 0.25, -0.3];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_of_orthogonal_vectors_is_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let result = cosine_similarity(&[1.0, 0.0], &[1.0]);
        assert!(matches!(
            result,
            Err(EmbeddingError::DimensionMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn test_zero_vector_similarity_is_zero() {
        let sim = cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_default_config() {
        let config = OllamaEmbedderConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "all-minilm");
    }
}
