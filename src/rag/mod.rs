//! RAG (Retrieval-Augmented Generation) module
//!
//! This module answers farmer questions end to end:
//! - Semantic cache lookup over previously answered questions
//! - Similarity retrieval over farmer-profile documents
//! - Prompt assembly and answer generation
//! - Background persistence of fresh answers as future cache entries
//!
//! # Examples
//!
//! ```rust,no_run
//! use agrisense::config::AppConfig;
//! use agrisense::rag::ChatRequest;
//! use agrisense::rag::ChatService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = ChatService::from_config(&config).await?;
//!
//!     let response = service
//!         .answer(ChatRequest::new("When should I sow wheat in Punjab?"))
//!         .await?;
//!     println!("[{:?}] {}", response.source, response.response);
//!
//!     service.memory().flush().await;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod context;
pub mod generator;
pub mod history;
pub mod memory;
pub mod pipeline;
pub mod prompts;
pub mod retriever;

use serde::Deserialize;
use serde::Serialize;

pub use cache::CacheLookup;
pub use cache::CacheStats;
pub use cache::SemanticCache;
pub use context::ContextAssembler;
pub use generator::AnswerGenerator;
pub use generator::GenerationInput;
pub use history::ConversationHistory;
pub use memory::InteractionRecorder;
pub use memory::MemoryWriter;
pub use pipeline::AnswerSource;
pub use pipeline::ChatRequest;
pub use pipeline::ChatResponse;
pub use pipeline::ChatService;
pub use retriever::ContextRetriever;
pub use retriever::RetrievedContext;
pub use retriever::Retrieval;

/// How a fresh (non-cached) answer is produced
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Retrieve similar farmer contexts and ground a detailed answer in them
    Grounded,
    /// Skip retrieval and ask for a short direct answer
    #[default]
    Fast,
}

impl GenerationMode {
    pub const fn uses_retrieval(self) -> bool {
        matches!(self, Self::Grounded)
    }
}
