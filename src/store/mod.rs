//! Vector store: persisted documents with k-nearest-neighbour queries
//!
//! Two backends share the [`VectorStore`] trait:
//! - [`InMemoryVectorStore`] for tests and throwaway runs
//! - [`FileVectorStore`], an append-only JSON-lines collection that is
//!   replayed into memory when opened and survives restarts

pub mod file;
pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub use file::FileVectorStore;
pub use memory::InMemoryVectorStore;

use crate::errors::Result;
use crate::models::Document;
use crate::models::DocumentType;
use crate::models::MetadataValue;
use crate::models::META_TYPE;

/// Distance function used to rank neighbours (smaller is closer)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Squared Euclidean distance
    #[default]
    L2,
    /// One minus cosine similarity
    Cosine,
}

impl DistanceMetric {
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::L2 => squared_l2(a, b),
            Self::Cosine => cosine_distance(a, b),
        }
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Returns 1.0 (orthogonal) if either vector has zero magnitude
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

/// Equality filter on one metadata field
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataFilter {
    pub key: String,
    pub value: MetadataValue,
}

impl MetadataFilter {
    pub fn new(key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Filter on the `type` field
    pub fn doc_type(doc_type: DocumentType) -> Self {
        Self::new(META_TYPE, doc_type.as_str())
    }

    pub fn matches(&self, document: &Document) -> bool {
        document.metadata.get(&self.key) == Some(&self.value)
    }
}

/// A query hit: the stored document and its distance from the query vector
#[derive(Debug, Clone)]
pub struct QueryMatch {
    pub document: Document,
    pub distance: f32,
}

/// Storage backend for embedded documents
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a document, replacing any existing document with the same id
    async fn upsert(&self, document: Document) -> Result<()>;

    /// Insert many documents
    async fn upsert_batch(&self, documents: Vec<Document>) -> Result<()> {
        for document in documents {
            self.upsert(document).await?;
        }
        Ok(())
    }

    /// Return at most `k` documents ordered by ascending distance
    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryMatch>>;

    /// Number of stored documents
    async fn count(&self) -> Result<usize>;

    /// Number of stored documents per `type` value
    async fn count_by_type(&self) -> Result<HashMap<String, usize>>;
}

/// Rank `documents` against `vector`; shared by the store backends
pub(crate) fn rank<'a, I>(
    documents: I,
    vector: &[f32],
    k: usize,
    metric: DistanceMetric,
    filter: Option<&MetadataFilter>,
) -> Vec<QueryMatch>
where
    I: Iterator<Item = &'a Document>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<QueryMatch> = documents
        .filter(|doc| filter.map_or(true, |f| f.matches(doc)))
        .map(|doc| QueryMatch {
            distance: metric.distance(&doc.vector, vector),
            document: doc.clone(),
        })
        .collect();

    scored.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.document.id.cmp(&b.document.id))
    });
    scored.truncate(k);
    scored
}

/// Tally documents by their `type` metadata
pub(crate) fn tally_types<'a, I>(documents: I) -> HashMap<String, usize>
where
    I: Iterator<Item = &'a Document>,
{
    let mut counts = HashMap::new();
    for doc in documents {
        let key = doc.meta_str(META_TYPE).unwrap_or("untyped").to_string();
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}
