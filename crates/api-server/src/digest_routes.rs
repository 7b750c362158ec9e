//! Digest endpoint: recent signals with market context.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use digest_service::{DigestRequest, DigestResponse};
use signal_core::SignalCategory;

use crate::{ApiResponse, AppError, AppState};

const MAX_ITEMS_CAP: i64 = 100;
const MAX_LOOKBACK_HOURS: i64 = 24 * 7;

#[derive(Debug, Deserialize)]
pub struct DigestParams {
    #[serde(default = "default_hours_lookback")]
    pub hours_lookback: i64,
    #[serde(default = "default_max_items")]
    pub max_items: i64,
    /// Comma-separated category names
    #[serde(default)]
    pub categories: Option<String>,
}

fn default_hours_lookback() -> i64 {
    24
}

fn default_max_items() -> i64 {
    20
}

pub(crate) fn parse_categories(raw: &str) -> Result<Vec<SignalCategory>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<SignalCategory>()
                .map_err(|e| anyhow::anyhow!(e).into())
        })
        .collect()
}

pub fn digest_routes() -> Router<AppState> {
    Router::new().route("/api/digest", get(get_digest))
}

async fn get_digest(
    State(state): State<AppState>,
    Query(params): Query<DigestParams>,
) -> Result<Json<ApiResponse<DigestResponse>>, AppError> {
    let categories = match &params.categories {
        Some(raw) => {
            let parsed = parse_categories(raw)?;
            if parsed.is_empty() {
                None
            } else {
                Some(parsed)
            }
        }
        None => None,
    };

    let request = DigestRequest {
        hours_lookback: params.hours_lookback.clamp(1, MAX_LOOKBACK_HOURS),
        max_items: params.max_items.clamp(1, MAX_ITEMS_CAP),
        categories,
    };

    let response = state.digest.build(&request).await?;
    Ok(Json(ApiResponse::success(response)))
}
