//! API request and response types

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::rag::CacheStats;

pub use crate::rag::ChatRequest;
pub use crate::rag::ChatResponse;

/// Error body returned with every non-2xx status
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Collection and cache statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_documents: usize,
    pub by_type: HashMap<String, usize>,
    pub cache: CacheSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheSummary {
    pub hits: u64,
    pub misses: u64,
    pub degraded: u64,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheSummary {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            degraded: stats.degraded,
            hit_rate: stats.hit_rate(),
        }
    }
}
