//! Social trending endpoint backed by Reddit mention data.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use social_sentiment::SocialMention;

use crate::{ApiResponse, AppError, AppState};

const TRENDING_LIMIT_CAP: usize = 50;

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

#[derive(Serialize)]
pub struct TrendingItem {
    #[serde(flatten)]
    pub mention: SocialMention,
    pub momentum: f64,
    pub hype_level: String,
}

pub fn social_routes() -> Router<AppState> {
    Router::new().route("/api/social/trending", get(get_trending))
}

async fn get_trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<ApiResponse<Vec<TrendingItem>>>, AppError> {
    let limit = params.limit.clamp(1, TRENDING_LIMIT_CAP);
    let mentions = state.social.get_trending_stocks(limit).await;

    let items: Vec<TrendingItem> = mentions
        .into_iter()
        .map(|mention| TrendingItem {
            momentum: mention.momentum(),
            hype_level: mention.hype_level().as_str().to_string(),
            mention,
        })
        .collect();

    Ok(Json(ApiResponse::success(items)))
}
