//! Similarity retrieval over the farmer context collection

use std::sync::Arc;

use tracing::debug;
use tracing::error;

use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::models::DocumentType;
use crate::store::VectorStore;

/// A retrieved document and its distance from the query
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedContext {
    pub id: String,
    pub text: String,
    pub distance: f32,
    pub doc_type: Option<DocumentType>,
}

/// Outcome of a retrieval
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    /// Matches ordered by ascending distance; may be empty
    Contexts(Vec<RetrievedContext>),
    /// Retrieval failed and the caller should continue without context
    Degraded(String),
}

impl Retrieval {
    pub fn contexts(&self) -> &[RetrievedContext] {
        match self {
            Self::Contexts(contexts) => contexts,
            Self::Degraded(_) => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.contexts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts().is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// Document texts in rank order
    pub fn texts(&self) -> Vec<&str> {
        self.contexts().iter().map(|c| c.text.as_str()).collect()
    }
}

/// Retriever over every document type in the collection
pub struct ContextRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl ContextRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Return up to `limit` documents most similar to `query`
    pub async fn retrieve(&self, query: &str, limit: usize) -> Retrieval {
        if limit == 0 {
            return Retrieval::Contexts(Vec::new());
        }

        match self.search(query, limit).await {
            Ok(contexts) => {
                debug!("Retrieved {} contexts for query", contexts.len());
                Retrieval::Contexts(contexts)
            }
            Err(e) => {
                error!("Error retrieving context: {}", e);
                Retrieval::Degraded(e.to_string())
            }
        }
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RetrievedContext>> {
        let vector = self.embedder.embed(query).await?;
        let matches = self.store.query(&vector, limit, None).await?;

        Ok(matches
            .into_iter()
            .map(|m| RetrievedContext {
                doc_type: m.document.doc_type(),
                id: m.document.id,
                text: m.document.text,
                distance: m.distance,
            })
            .collect())
    }
}
