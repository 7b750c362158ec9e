//! On-demand signal generation endpoint.

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;

use signal_core::Signal;

use crate::{ApiResponse, AppError, AppState};

#[derive(Serialize)]
pub struct GenerateResponse {
    pub generated: usize,
    pub signals: Vec<Signal>,
}

pub fn signal_routes() -> Router<AppState> {
    Router::new().route("/api/signals/generate", post(generate_signals))
}

async fn generate_signals(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<GenerateResponse>>, AppError> {
    let signals = state.engine.generate().await?;
    tracing::info!("Generated {} signals on request", signals.len());

    Ok(Json(ApiResponse::success(GenerateResponse {
        generated: signals.len(),
        signals,
    })))
}
