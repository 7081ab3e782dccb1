//! Deterministic stand-ins for the embedding and generation services
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use agrisense::config::AppConfig;
use agrisense::embeddings::Embedder;
use agrisense::embeddings::HashEmbedder;
use agrisense::llm::CompletionRequest;
use agrisense::llm::CompletionService;
use agrisense::models::FarmerProfile;
use agrisense::rag::ChatService;
use agrisense::store::InMemoryVectorStore;
use agrisense::AgriSenseError;
use agrisense::Result;
use async_trait::async_trait;

pub const DIM: usize = 64;

/// Fixed vectors for known texts, feature hashing for everything else
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: HashEmbedder,
}

impl TableEmbedder {
    pub fn new(entries: &[(&str, Vec<f32>)]) -> Self {
        let dimension = entries.first().map_or(DIM, |(_, v)| v.len());
        Self {
            table: entries
                .iter()
                .map(|(text, vector)| ((*text).to_string(), vector.clone()))
                .collect(),
            fallback: HashEmbedder::new(dimension).unwrap(),
        }
    }
}

#[async_trait]
impl Embedder for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.embed_sync(text)))
    }

    fn dimension(&self) -> usize {
        self.fallback.dimension()
    }
}

/// Completion service that returns a fixed reply or a fixed failure
pub struct ScriptedCompletion {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(detail: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(detail.to_string()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(AgriSenseError::LlmError)
    }
}

/// Chat service over an in-memory store and the hashing embedder
pub fn chat_service(
    config: &AppConfig,
    completion: Arc<ScriptedCompletion>,
) -> (ChatService, Arc<InMemoryVectorStore>) {
    let store = Arc::new(InMemoryVectorStore::new());
    let service = ChatService::from_parts(
        config,
        Arc::new(HashEmbedder::new(DIM).unwrap()),
        store.clone(),
        completion,
    );
    (service, store)
}

pub fn punjab_farmer() -> FarmerProfile {
    FarmerProfile {
        id: Some("1".to_string()),
        name: Some("Gurpreet Singh".to_string()),
        location: Some("Punjab".to_string()),
        crops: vec!["Wheat".to_string(), "Rice".to_string()],
        land_size: Some("12 acres".to_string()),
        soil_type: Some("Alluvial".to_string()),
        irrigation: Some("Tube well".to_string()),
        challenges: Some("Falling groundwater".to_string()),
        previous_queries: vec![
            "When to sow wheat after paddy?".to_string(),
            "Alternatives to burning stubble".to_string(),
        ],
    }
}
