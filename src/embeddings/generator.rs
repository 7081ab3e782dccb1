//! Embedding generation service with preprocessing and dimension checks

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::StreamExt;
use futures::stream;
use tracing::info;

use super::client::EmbeddingClient;
use super::hashing::HashEmbedder;
use super::text_preprocessing::preprocess_text_for_embedding;
use super::Embedder;
use super::EmbeddingProvider;
use super::MAX_CONCURRENT_REQUESTS;
use crate::config::EmbeddingsConfig;
use crate::errors::AgriSenseError;
use crate::errors::Result;

enum Backend {
    Remote(EmbeddingClient),
    Hashing(HashEmbedder),
}

/// Configured embedder used by the rest of the application
pub struct EmbeddingService {
    backend: Backend,
    dimension: usize,
    max_text_chars: usize,
}

impl EmbeddingService {
    /// Create a new embedding service from the `[embeddings]` section
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let backend = match config.provider {
            EmbeddingProvider::Hashing => Backend::Hashing(HashEmbedder::new(config.dimension)?),
            provider => Backend::Remote(EmbeddingClient::new(
                provider,
                config.model.clone(),
                config.endpoint.clone(),
                config.api_key.clone(),
                Duration::from_secs(config.timeout_secs),
            )?),
        };

        info!(
            "Embedding service ready: provider={:?}, model={}, dimension={}",
            config.provider, config.model, config.dimension
        );

        Ok(Self {
            backend,
            dimension: config.dimension,
            max_text_chars: config.max_text_chars,
        })
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let processed = preprocess_text_for_embedding(text, self.max_text_chars)?;

        let vector = match &self.backend {
            Backend::Remote(client) => client.generate(&processed).await?,
            Backend::Hashing(embedder) => embedder.embed_sync(&processed),
        };

        if vector.len() != self.dimension {
            return Err(AgriSenseError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let concurrency = texts.len().clamp(1, MAX_CONCURRENT_REQUESTS);
        let jobs: Vec<_> = texts.iter().map(|text| self.embed(text)).collect();
        let results: Vec<Result<Vec<f32>>> = stream::iter(jobs)
            .buffered(concurrency)
            .collect()
            .await;

        results.into_iter().collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
