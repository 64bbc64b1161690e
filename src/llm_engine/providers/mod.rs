// Concrete LLM providers

pub mod ollama_provider;

pub use ollama_provider::{OllamaConfig, OllamaProvider};
