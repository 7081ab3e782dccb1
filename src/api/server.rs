//! HTTP server implementation

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::rag::ChatService;
use crate::Result;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the application router with its middleware stack
pub fn build_router(chat: Arc<ChatService>, enable_cors: bool) -> Router {
    let state = AppState { chat };

    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server and run until Ctrl-C
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("Starting AgriSense API server...");

    if !config.has_llm_key() {
        warn!("No LLM API key configured; uncached questions will fail with 502");
    }

    let chat = Arc::new(ChatService::from_config(config).await?);
    let app = build_router(chat.clone(), enable_cors);
    if enable_cors {
        info!("CORS enabled");
    }

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /api/health  - Health check");
    info!("  POST /api/chat    - Ask a farming question");
    info!("  GET  /api/stats   - Collection statistics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Draining pending memory writes...");
    chat.memory().shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
