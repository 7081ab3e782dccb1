//! Chat pipeline: Cache -> Retrieve -> Generate -> Remember

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use super::AnswerGenerator;
use super::CacheLookup;
use super::CacheStats;
use super::ContextAssembler;
use super::ContextRetriever;
use super::ConversationHistory;
use super::GenerationInput;
use super::GenerationMode;
use super::InteractionRecorder;
use super::MemoryWriter;
use super::Retrieval;
use super::SemanticCache;
use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::errors::AgriSenseError;
use crate::errors::Result;
use crate::llm::ChatCompletionsClient;
use crate::llm::CompletionService;
use crate::models::FarmerProfile;
use crate::models::Language;
use crate::models::UNKNOWN;
use crate::store::FileVectorStore;
use crate::store::VectorStore;

/// Incoming chat question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub farmer_profile: FarmerProfile,
}

fn default_language() -> String {
    "english".to_string()
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            language: default_language(),
            farmer_profile: FarmerProfile::default(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: FarmerProfile) -> Self {
        self.farmer_profile = profile;
        self
    }
}

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    Cache,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub contexts_used: usize,
    pub source: AnswerSource,
}

/// Explicitly constructed service context shared by the HTTP and CLI fronts
pub struct ChatService {
    cache: SemanticCache,
    retriever: ContextRetriever,
    generator: AnswerGenerator,
    memory: MemoryWriter,
    history: Option<ConversationHistory>,
    store: Arc<dyn VectorStore>,
    cache_enabled: bool,
    mode: GenerationMode,
    retrieval_limit: usize,
}

impl ChatService {
    /// Build every collaborator from configuration and start the memory worker
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(&config.embeddings)?);
        let store: Arc<dyn VectorStore> = Arc::new(
            FileVectorStore::open(&config.store.path, &config.store.collection, config.store.metric)
                .await?,
        );
        let completion: Arc<dyn CompletionService> =
            Arc::new(ChatCompletionsClient::new(&config.llm)?);

        info!(
            "Chat service ready: collection={} mode={:?} cache={}",
            config.store.collection, config.llm.mode, config.cache.enabled
        );
        Ok(Self::from_parts(config, embedder, store, completion))
    }

    /// Assemble the service from existing collaborators
    ///
    /// Must be called inside a tokio runtime; the memory worker is spawned here.
    pub fn from_parts(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        completion: Arc<dyn CompletionService>,
    ) -> Self {
        let cache = SemanticCache::new(
            embedder.clone(),
            store.clone(),
            config.cache.threshold,
            config.cache.interactions_only,
        );
        let retriever = ContextRetriever::new(embedder.clone(), store.clone());
        let generator = AnswerGenerator::new(
            completion,
            config.llm.clone(),
            ContextAssembler::new(config.retrieval.prompt_contexts, 4000),
        );
        let memory = MemoryWriter::spawn(InteractionRecorder::new(embedder, store.clone()));
        let history = config
            .history
            .enabled
            .then(|| ConversationHistory::new(config.history.max_messages));

        Self {
            cache,
            retriever,
            generator,
            memory,
            history,
            store,
            cache_enabled: config.cache.enabled,
            mode: config.llm.mode,
            retrieval_limit: config.retrieval.limit,
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn memory(&self) -> &MemoryWriter {
        &self.memory
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Answer with the configured generation mode
    pub async fn answer(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.answer_with_mode(request, self.mode).await
    }

    /// Answer one question
    ///
    /// # Errors
    /// - `InvalidInput` for a blank message; nothing else runs
    /// - `LlmError` when generation fails; nothing is remembered
    pub async fn answer_with_mode(
        &self,
        request: ChatRequest,
        mode: GenerationMode,
    ) -> Result<ChatResponse> {
        let started = Instant::now();
        let question = request.message.trim();
        if question.is_empty() {
            return Err(AgriSenseError::InvalidInput(
                "No question provided".to_string(),
            ));
        }

        let profile = &request.farmer_profile;
        let farmer_id = profile.farmer_id_or_unknown();

        if self.cache_enabled {
            if let CacheLookup::Hit {
                answer, distance, ..
            } = self.cache.check(question).await
            {
                info!(
                    "Cache hit (distance {:.4}) in {:.2}s",
                    distance,
                    started.elapsed().as_secs_f64()
                );
                self.remember_exchange(farmer_id, question, &answer);
                return Ok(ChatResponse {
                    response: answer,
                    contexts_used: 1,
                    source: AnswerSource::Cache,
                });
            }
        }

        let retrieval = if mode.uses_retrieval() {
            self.retriever.retrieve(question, self.retrieval_limit).await
        } else {
            Retrieval::Contexts(Vec::new())
        };
        debug!("Using {} retrieved contexts", retrieval.len());

        let history = self.recent_history(farmer_id);
        let answer = self
            .generator
            .generate(&GenerationInput {
                question,
                language: Language::from_request(&request.language),
                profile,
                contexts: retrieval.contexts(),
                history,
                mode,
            })
            .await?;

        self.memory.record(question, &answer, profile);
        self.remember_exchange(farmer_id, question, &answer);

        info!(
            "AI answer generated in {:.2}s",
            started.elapsed().as_secs_f64()
        );
        Ok(ChatResponse {
            response: answer,
            contexts_used: retrieval.len(),
            source: AnswerSource::Ai,
        })
    }

    fn recent_history(&self, farmer_id: &str) -> Vec<crate::llm::ChatMessage> {
        match &self.history {
            Some(history) if farmer_id != UNKNOWN => history.recent(farmer_id),
            _ => Vec::new(),
        }
    }

    /// Anonymous callers share no history
    fn remember_exchange(&self, farmer_id: &str, question: &str, answer: &str) {
        if let Some(history) = &self.history {
            if farmer_id != UNKNOWN {
                history.append(farmer_id, question, answer);
            }
        }
    }
}
