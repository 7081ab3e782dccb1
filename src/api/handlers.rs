//! API request handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::api::types::ChatRequest;
use crate::api::types::ChatResponse;
use crate::api::types::ErrorResponse;
use crate::api::types::HealthResponse;
use crate::api::types::StatsResponse;
use crate::errors::AgriSenseError;
use crate::rag::ChatService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
}

/// Error converted into a status code and `{error}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<AgriSenseError> for ApiError {
    fn from(err: AgriSenseError) -> Self {
        let status = match &err {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            AgriSenseError::LlmError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Answer a farmer question (POST /api/chat)
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected chat payload: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    })?;

    info!(
        "POST /api/chat (language={}, message_len={})",
        request.language,
        request.message.len()
    );

    match state.chat.answer(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            if e.is_client_error() {
                warn!("Invalid chat request: {}", e);
            } else {
                error!("Chat request failed: {}", e);
            }
            Err(e.into())
        }
    }
}

/// Collection statistics (GET /api/stats)
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let store = state.chat.store();
    let total_documents = store.count().await?;
    let by_type = store.count_by_type().await?;

    Ok(Json(StatsResponse {
        total_documents,
        by_type,
        cache: state.chat.cache_stats().into(),
    }))
}
