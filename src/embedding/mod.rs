// Sentence embedding module
//
// embedder.rs: SentenceEmbedder trait, Ollama-backed implementation and
//              cosine similarity
// mock.rs: deterministic local embedder for tests and offline runs

pub mod embedder;
pub mod mock;

pub use embedder::{
    cosine_similarity, EmbeddingError, OllamaEmbedder, OllamaEmbedderConfig, SentenceEmbedder,
};
pub use mock::MockEmbedder;
