//! AgriSense: retrieval-augmented advisory chatbot backend for farmers
//!
//! Questions are answered from a semantic cache of earlier answers when a
//! close enough match exists; otherwise an LLM generates a fresh answer,
//! optionally grounded in similar farmer profiles, and the exchange is
//! stored in the background so the next similar question is a cache hit.

pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod store;

pub use config::AppConfig;
pub use errors::*;
pub use rag::ChatRequest;
pub use rag::ChatResponse;
pub use rag::ChatService;
