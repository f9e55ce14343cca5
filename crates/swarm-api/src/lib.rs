//! Swarm API /v1: chat front end over one pipeline
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod session;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use swarm_core::PipelineRunner;
use tower_http::trace::TraceLayer;

pub use metrics::Metrics;
pub use session::{ChatSession, Exchange, TurnOutcome};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PipelineRunner>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(pipeline: PipelineRunner) -> Result<Self, prometheus::Error> {
        Ok(Self {
            pipeline: Arc::new(pipeline),
            metrics: Metrics::new()?,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/run", post(handlers::run))
        .route("/v1/chat", post(handlers::chat))
        .route("/v1/pipeline", get(handlers::describe_pipeline))
        .route("/v1/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Swarm API listening on {}", addr);
    axum::serve(listener, app).await
}
