//! Deterministic local embedder
//!
//! Hash-bucketed bag of bytes, L2-normalized. Not semantically strong, but
//! stable across runs, which is what tests and offline smoke runs need.

use async_trait::async_trait;

use super::embedder::{EmbeddingError, SentenceEmbedder};

const DIMS: usize = 64;

pub struct MockEmbedder;

impl MockEmbedder {
    fn embed_text(input: &str) -> Vec<f32> {
        let mut v = vec![0f32; DIMS];
        for (i, b) in input.as_bytes().iter().enumerate() {
            let idx = (i.wrapping_mul(31) ^ (*b as usize)) % DIMS;
            v[idx] += (*b as f32) / 255.0;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl SentenceEmbedder for MockEmbedder {
    fn embedder_name(&self) -> &'static str {
        "mock"
    }

    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(inputs.iter().map(|s| Self::embed_text(s)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine_similarity;

    #[tokio::test]
    async fn test_mock_embeddings_are_deterministic() {
        let embedder = MockEmbedder;
        let first = embedder.embed("the same sentence").await.unwrap();
        let second = embedder.embed("the same sentence").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_identical_texts_have_maximal_similarity() {
        let embedder = MockEmbedder;
        let a = embedder.embed("hello world").await.unwrap();
        let b = embedder.embed("hello world").await.unwrap();
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }
}
