//! Background persistence of answered questions
//!
//! Fresh answers are stored as `interaction` documents so the semantic
//! cache can serve them later. Callers hand jobs to [`MemoryWriter::record`],
//! which only enqueues; a single tokio task drains the queue in order.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;
use uuid::Uuid;

use crate::embeddings::Embedder;
use crate::errors::AgriSenseError;
use crate::errors::Result;
use crate::models::Document;
use crate::models::DocumentType;
use crate::models::FarmerProfile;
use crate::models::META_ANSWER;
use crate::models::META_CREATED_AT;
use crate::models::META_FARMER_ID;
use crate::models::META_LOCATION;
use crate::models::META_TYPE;
use crate::store::VectorStore;

/// Embeds a question and stores it with its answer
#[derive(Clone)]
pub struct InteractionRecorder {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl InteractionRecorder {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Persist one interaction and return its new id
    pub async fn write(
        &self,
        question: &str,
        answer: &str,
        profile: &FarmerProfile,
    ) -> Result<String> {
        if question.trim().is_empty() || answer.trim().is_empty() {
            return Err(AgriSenseError::InvalidInput(
                "both question and answer are required".to_string(),
            ));
        }

        let vector = self.embedder.embed(question).await?;
        let id = Uuid::new_v4().to_string();
        let document = Document::new(&id, question, vector)
            .with_metadata(META_TYPE, DocumentType::Interaction.as_str())
            .with_metadata(META_ANSWER, answer)
            .with_metadata(META_FARMER_ID, profile.farmer_id_or_unknown())
            .with_metadata(META_LOCATION, profile.location_or_unknown())
            .with_metadata(META_CREATED_AT, Utc::now().to_rfc3339());

        self.store.upsert(document).await?;
        Ok(id)
    }
}

struct MemoryJob {
    question: String,
    answer: String,
    profile: FarmerProfile,
}

enum Command {
    Record(MemoryJob),
    /// Acknowledged once every earlier job has been handled
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Handle to the background memory worker
pub struct MemoryWriter {
    sender: mpsc::UnboundedSender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryWriter {
    /// Start the worker task; must be called inside a tokio runtime
    pub fn spawn(recorder: InteractionRecorder) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(recorder, receiver));
        Self {
            sender,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Queue an interaction for storage and return immediately
    pub fn record(&self, question: &str, answer: &str, profile: &FarmerProfile) {
        let job = MemoryJob {
            question: question.to_string(),
            answer: answer.to_string(),
            profile: profile.clone(),
        };
        if self.sender.send(Command::Record(job)).is_err() {
            warn!("Memory writer is shut down, interaction not saved");
        }
    }

    /// Wait until every interaction queued so far has been handled
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Drain the queue and stop the worker
    pub async fn shutdown(&self) {
        let Some(worker) = self.worker.lock().await.take() else {
            return;
        };
        let _ = self.sender.send(Command::Shutdown);
        if let Err(e) = worker.await {
            warn!("Memory worker ended abnormally: {}", e);
        }
        info!("Memory writer stopped");
    }
}

async fn run_worker(recorder: InteractionRecorder, mut receiver: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = receiver.recv().await {
        match command {
            Command::Record(job) => persist(&recorder, job).await,
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
            Command::Shutdown => break,
        }
    }

    // Anything queued behind the shutdown request is still written
    receiver.close();
    while let Some(command) = receiver.recv().await {
        match command {
            Command::Record(job) => persist(&recorder, job).await,
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
            Command::Shutdown => {}
        }
    }
}

async fn persist(recorder: &InteractionRecorder, job: MemoryJob) {
    if job.question.trim().is_empty() || job.answer.trim().is_empty() {
        debug!("Skipping memory write with empty question or answer");
        return;
    }

    match recorder.write(&job.question, &job.answer, &job.profile).await {
        Ok(id) => {
            let preview: String = job.question.chars().take(30).collect();
            info!("Saved interaction {}: {}...", id, preview);
        }
        Err(e) => warn!("Error saving to memory: {}", e),
    }
}
