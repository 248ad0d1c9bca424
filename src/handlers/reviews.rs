use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::{RatingBucket, RatingStats};
use crate::services::reviews::{self, ReviewDraft};
use crate::state::AppState;

// POST /api/reviews
pub async fn submit_review(
    State(state): State<Arc<AppState>>,
    AppJson(draft): AppJson<ReviewDraft>,
) -> Result<impl IntoResponse, AppError> {
    let (review, auto_verified) = reviews::submit(&state, draft).await?;

    let message = if auto_verified {
        "Review submitted and verified successfully!"
    } else {
        "Review submitted! It will be verified by our team."
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": message,
            "review": review,
        })),
    ))
}

// GET /api/reviews
#[derive(Deserialize)]
pub struct ReviewsQuery {
    pub limit: Option<i64>,
    pub verified: Option<String>,
}

pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    // A non-positive limit would read as "unbounded" in SQLite's LIMIT.
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let only_verified = query.verified.as_deref().unwrap_or("true") == "true";

    let (reviews, stats, distribution) = reviews::list_public(&state, only_verified, limit)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "reviews": reviews,
        "stats": stats_json(&stats, Some(&distribution)),
    })))
}

// GET /api/reviews/stats
pub async fn review_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (stats, distribution) = reviews::stats(&state)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "stats": stats_json(&stats, Some(&distribution)),
    })))
}

pub fn stats_json(stats: &RatingStats, distribution: Option<&[RatingBucket]>) -> serde_json::Value {
    // Display rounding only; the stored ratings stay integers.
    let average = (stats.average_rating * 10.0).round() / 10.0;
    let mut value = serde_json::json!({
        "averageRating": average,
        "totalReviews": stats.total_reviews,
    });
    if let Some(distribution) = distribution {
        value["distribution"] = serde_json::json!(distribution);
    }
    value
}
