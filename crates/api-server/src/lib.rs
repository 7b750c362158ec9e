//! HTTP API for the signal backend: digest retrieval, on-demand signal
//! generation, and social trending data.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use digest_service::DigestService;
use market_data::MarketDataService;
use news_aggregator::NewsAggregator;
use sentiment_analysis::SentimentScorer;
use signal_core::{FusionConfig, HistoryStore, MarketDataProvider, NewsProvider, SignalStore};
use signal_fusion::SignalEngine;
use signal_history::{SqliteHistoryStore, SqliteSignalStore};
use social_sentiment::SocialSentimentService;

pub mod digest_routes;
pub mod signal_routes;
pub mod social_routes;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SignalEngine>,
    pub digest: Arc<DigestService>,
    pub social: Arc<SocialSentimentService>,
}

/// Standard envelope for all API responses
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Handler error that renders as a JSON 500
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {:#}", self.0);
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.0.to_string(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(digest_routes::digest_routes())
        .merge(signal_routes::signal_routes())
        .merge(social_routes::social_routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://signals.db?mode=rwc".to_string());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let history = Arc::new(SqliteHistoryStore::new(pool.clone()));
    history.init().await?;
    let store = Arc::new(SqliteSignalStore::new(pool.clone()));
    store.init().await?;

    let market = Arc::new(MarketDataService::from_env());
    let news = Arc::new(NewsAggregator::from_env());
    let scorer = SentimentScorer::from_env();

    let engine = Arc::new(SignalEngine::new(
        market.clone() as Arc<dyn MarketDataProvider>,
        news as Arc<dyn NewsProvider>,
        scorer,
        history as Arc<dyn HistoryStore>,
        store.clone() as Arc<dyn SignalStore>,
        FusionConfig::default(),
    ));
    let digest = Arc::new(DigestService::new(
        store as Arc<dyn SignalStore>,
        market as Arc<dyn MarketDataProvider>,
    ));
    let social = Arc::new(SocialSentimentService::new());

    let state = AppState {
        engine,
        digest,
        social,
    };
    let app = build_router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Signal API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_debug_carries_the_source() {
        let err: AppError = anyhow::anyhow!("pool exhausted").into();
        assert!(format!("{:?}", err).contains("pool exhausted"));
    }
}
