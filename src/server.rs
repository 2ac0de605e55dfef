use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use hyper::Server;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinError;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::app::feed_use_case::FeedUseCase;
use crate::observability::metrics;

const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedUseCase>,
}

/// Body of a successful feed response
#[derive(Debug, Serialize)]
pub struct FeedResponse<T> {
    pub success: bool,
    pub news: Vec<T>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "news-feed",
        "version": env!("CARGO_PKG_VERSION"),
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Prometheus scrape endpoint
async fn metrics_text() -> Response {
    match metrics::render() {
        Some(body) => body.into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Validated, deduplicated, moderated and phone-masked news
async fn processed_news(State(state): State<AppState>) -> Response {
    let feed = state.feed.clone();
    let outcome = tokio::spawn(async move { feed.processed_feed().await }).await;
    respond("/news", outcome)
}

/// Unfiltered rows exactly as submitted
async fn raw_news(State(state): State<AppState>) -> Response {
    let feed = state.feed.clone();
    let outcome = tokio::spawn(async move { feed.raw_feed().await }).await;
    respond("/news/raw", outcome)
}

// The pipeline runs on its own task so a panic becomes a JoinError here
// instead of tearing down the connection.
fn respond<T: Serialize>(
    endpoint: &'static str,
    outcome: std::result::Result<crate::error::Result<Vec<T>>, JoinError>,
) -> Response {
    match outcome {
        Ok(Ok(news)) => Json(FeedResponse {
            success: true,
            news,
        })
        .into_response(),
        Ok(Err(e)) => {
            error!(endpoint, "Error processing news: {}", e);
            internal_error(endpoint)
        }
        Err(e) => {
            error!(endpoint, "News pipeline task failed: {}", e);
            internal_error(endpoint)
        }
    }
}

fn internal_error(endpoint: &'static str) -> Response {
    metrics::pipeline::failure(endpoint);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            success: false,
            error: INTERNAL_ERROR_MESSAGE,
        }),
    )
        .into_response()
}

/// Create the HTTP router with all routes
pub fn create_server(feed: Arc<FeedUseCase>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .route("/news", get(processed_news))
        .route("/news/raw", get(raw_news))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(AppState { feed })
}

/// Start the HTTP server on the specified port and run until Ctrl-C
pub async fn start_server(feed: Arc<FeedUseCase>, port: u16) -> anyhow::Result<()> {
    let app = create_server(feed);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Server running on http://localhost:{port}");
    info!("Processed feed: http://localhost:{port}/news");
    info!("Raw feed:       http://localhost:{port}/news/raw");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
