//! Embeddings generation module
//!
//! This module turns text into fixed-length vectors using one of:
//! - OpenAI-compatible embeddings endpoints
//! - Ollama (local models)
//! - A deterministic feature-hashing embedder that needs no network
//!
//! # Examples
//!
//! ```rust,no_run
//! use agrisense::config::AppConfig;
//! use agrisense::embeddings::Embedder;
//! use agrisense::embeddings::EmbeddingService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config.embeddings)?;
//!
//!     let embedding = service.embed("When should I sow wheat?").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;
pub mod hashing;
pub mod text_preprocessing;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub use client::EmbeddingClient;
pub use generator::EmbeddingService;
pub use hashing::HashEmbedder;
pub use text_preprocessing::preprocess_text_for_embedding;

use crate::errors::Result;

/// Maximum number of concurrent embedding requests during batch work
pub const MAX_CONCURRENT_REQUESTS: usize = 16;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// `OpenAI` embeddings API (or any compatible endpoint)
    OpenAI,
    /// Ollama local embeddings
    Ollama,
    /// In-process FNV-1a feature hashing
    #[default]
    Hashing,
}

/// Maps text to a fixed-length vector
///
/// Implementations must be deterministic for identical input and always
/// return vectors of [`dimension`](Embedder::dimension) length.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts; the default embeds them one after another
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Length of every vector this embedder produces
    fn dimension(&self) -> usize;
}
