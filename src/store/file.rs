//! File-backed vector store
//!
//! Each collection is an append-only JSON-lines log at
//! `<dir>/<collection>.jsonl`. Opening the store replays the log into
//! memory; a later line with an existing id replaces the earlier one.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::memory::Collection;
use super::rank;
use super::tally_types;
use super::DistanceMetric;
use super::MetadataFilter;
use super::QueryMatch;
use super::VectorStore;
use crate::errors::AgriSenseError;
use crate::errors::Result;
use crate::models::Document;

struct State {
    collection: Collection,
    log: File,
}

/// Durable vector store backed by a JSON-lines log
pub struct FileVectorStore {
    path: PathBuf,
    metric: DistanceMetric,
    state: RwLock<State>,
}

impl FileVectorStore {
    /// Open (or create) the collection under `dir`
    pub async fn open(
        dir: impl AsRef<Path>,
        collection: &str,
        metric: DistanceMetric,
    ) -> Result<Self> {
        if collection.is_empty() || collection.contains(['/', '\\']) {
            return Err(AgriSenseError::VectorStoreError(format!(
                "invalid collection name '{collection}'"
            )));
        }

        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{collection}.jsonl"));

        let mut loaded = Collection::default();
        let mut skipped = 0usize;
        let mut torn_tail = false;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                torn_tail = !content.is_empty() && !content.ends_with('\n');
                for (line_no, line) in content.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let parsed = serde_json::from_str::<Document>(line)
                        .map_err(AgriSenseError::from)
                        .and_then(|doc| loaded.insert(doc));
                    if let Err(e) = parsed {
                        skipped += 1;
                        warn!("Skipping line {} of {}: {}", line_no + 1, path.display(), e);
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        // A crash mid-append leaves a partial last line; terminate it so the
        // next append starts on a line of its own
        if torn_tail {
            warn!("Log {} ends mid-line, terminating it", path.display());
            log.write_all(b"\n").await?;
            log.flush().await?;
        }

        info!(
            "Opened vector store {} ({} documents, {} skipped)",
            path.display(),
            loaded.documents.len(),
            skipped
        );

        Ok(Self {
            path,
            metric,
            state: RwLock::new(State {
                collection: loaded,
                log,
            }),
        })
    }

    /// Location of the collection log
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl VectorStore for FileVectorStore {
    async fn upsert(&self, document: Document) -> Result<()> {
        let mut line = serde_json::to_string(&document)?;
        line.push('\n');

        let mut state = self.state.write().await;
        state.collection.check_dimension(document.vector.len())?;
        if document.vector.is_empty() {
            return Err(AgriSenseError::VectorStoreError(format!(
                "document '{}' has an empty vector",
                document.id
            )));
        }

        state.log.write_all(line.as_bytes()).await?;
        state.log.flush().await?;
        debug!("Appended document {} to {}", document.id, self.path.display());

        state.collection.insert(document)
    }

    async fn upsert_batch(&self, documents: Vec<Document>) -> Result<()> {
        let mut state = self.state.write().await;
        let mut buffer = String::new();
        let mut expected = state.collection.dimension;
        for document in &documents {
            let actual = document.vector.len();
            if actual == 0 {
                return Err(AgriSenseError::VectorStoreError(format!(
                    "document '{}' has an empty vector",
                    document.id
                )));
            }
            match expected {
                Some(expected) if expected != actual => {
                    return Err(AgriSenseError::DimensionMismatch { expected, actual });
                }
                _ => expected = Some(actual),
            }
            buffer.push_str(&serde_json::to_string(document)?);
            buffer.push('\n');
        }

        state.log.write_all(buffer.as_bytes()).await?;
        state.log.flush().await?;

        for document in documents {
            state.collection.insert(document)?;
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryMatch>> {
        let state = self.state.read().await;
        state.collection.check_dimension(vector.len())?;
        Ok(rank(
            state.collection.documents.values(),
            vector,
            k,
            self.metric,
            filter,
        ))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.collection.documents.len())
    }

    async fn count_by_type(&self) -> Result<HashMap<String, usize>> {
        Ok(tally_types(
            self.state.read().await.collection.documents.values(),
        ))
    }
}
