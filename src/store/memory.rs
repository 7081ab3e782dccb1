//! In-memory vector store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::rank;
use super::tally_types;
use super::DistanceMetric;
use super::MetadataFilter;
use super::QueryMatch;
use super::VectorStore;
use crate::errors::AgriSenseError;
use crate::errors::Result;
use crate::models::Document;

/// Documents keyed by id, plus the dimension fixed by the first insert
#[derive(Debug, Default)]
pub(crate) struct Collection {
    pub(crate) documents: HashMap<String, Document>,
    pub(crate) dimension: Option<usize>,
}

impl Collection {
    pub(crate) fn check_dimension(&self, actual: usize) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != actual => {
                Err(AgriSenseError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn insert(&mut self, document: Document) -> Result<()> {
        if document.vector.is_empty() {
            return Err(AgriSenseError::VectorStoreError(format!(
                "document '{}' has an empty vector",
                document.id
            )));
        }
        self.check_dimension(document.vector.len())?;
        self.dimension.get_or_insert(document.vector.len());
        self.documents.insert(document.id.clone(), document);
        Ok(())
    }
}

/// Vector store held entirely in memory; contents are lost on drop
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collection: RwLock<Collection>,
    metric: DistanceMetric,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metric(metric: DistanceMetric) -> Self {
        Self {
            collection: RwLock::new(Collection::default()),
            metric,
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, document: Document) -> Result<()> {
        self.collection.write().await.insert(document)
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryMatch>> {
        let collection = self.collection.read().await;
        collection.check_dimension(vector.len())?;
        Ok(rank(
            collection.documents.values(),
            vector,
            k,
            self.metric,
            filter,
        ))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.collection.read().await.documents.len())
    }

    async fn count_by_type(&self) -> Result<HashMap<String, usize>> {
        Ok(tally_types(self.collection.read().await.documents.values()))
    }
}
