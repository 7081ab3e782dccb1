//! Semantic answer cache
//!
//! A previous interaction is reused when its question embeds strictly
//! closer than the threshold to the incoming question. Lookups never fail:
//! embedding or store errors come back as [`CacheLookup::Degraded`], which
//! callers treat as a miss.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::models::DocumentType;
use crate::store::MetadataFilter;
use crate::store::VectorStore;

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// A close enough interaction with a stored answer
    Hit {
        answer: String,
        distance: f32,
        document_id: String,
    },
    /// Nothing usable; `nearest` is the closest distance seen, if any
    Miss { nearest: Option<f32> },
    /// The lookup itself failed
    Degraded(String),
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Hit { answer, .. } => Some(answer),
            _ => None,
        }
    }
}

/// Strict comparison; NaN never passes
pub fn within_threshold(distance: f32, threshold: f32) -> bool {
    distance < threshold
}

/// Lookup counters since startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub degraded: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.degraded;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    degraded: AtomicU64,
}

pub struct SemanticCache {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    threshold: f32,
    interactions_only: bool,
    counters: Counters,
}

impl SemanticCache {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        threshold: f32,
        interactions_only: bool,
    ) -> Self {
        Self {
            embedder,
            store,
            threshold,
            interactions_only,
            counters: Counters::default(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            degraded: self.counters.degraded.load(Ordering::Relaxed),
        }
    }

    /// Look up a stored answer for `query`
    pub async fn check(&self, query: &str) -> CacheLookup {
        let lookup = match self.lookup(query).await {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!("Cache check failed, continuing without cache: {}", e);
                CacheLookup::Degraded(e.to_string())
            }
        };

        let counter = match lookup {
            CacheLookup::Hit { .. } => &self.counters.hits,
            CacheLookup::Miss { .. } => &self.counters.misses,
            CacheLookup::Degraded(_) => &self.counters.degraded,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        lookup
    }

    async fn lookup(&self, query: &str) -> Result<CacheLookup> {
        let vector = self.embedder.embed(query).await?;

        let filter = self
            .interactions_only
            .then(|| MetadataFilter::doc_type(DocumentType::Interaction));
        let nearest = self
            .store
            .query(&vector, 1, filter.as_ref())
            .await?
            .into_iter()
            .next();

        let Some(nearest) = nearest else {
            debug!("Cache miss: store has no candidates");
            return Ok(CacheLookup::Miss { nearest: None });
        };

        if !within_threshold(nearest.distance, self.threshold) {
            debug!(
                "Cache miss: nearest distance {:.4} >= threshold {}",
                nearest.distance, self.threshold
            );
            return Ok(CacheLookup::Miss {
                nearest: Some(nearest.distance),
            });
        }

        match nearest.document.cached_answer() {
            Some(answer) => {
                debug!(
                    "Cache hit: {} at distance {:.4}",
                    nearest.document.id, nearest.distance
                );
                Ok(CacheLookup::Hit {
                    answer: answer.to_string(),
                    distance: nearest.distance,
                    document_id: nearest.document.id.clone(),
                })
            }
            None => {
                debug!(
                    "Cache miss: nearest document {} carries no answer",
                    nearest.document.id
                );
                Ok(CacheLookup::Miss {
                    nearest: Some(nearest.distance),
                })
            }
        }
    }
}
