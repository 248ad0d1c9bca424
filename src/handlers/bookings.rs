use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::services::bookings::{self, BookingDraft};
use crate::state::AppState;

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let bookings = bookings::list(&state)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "bookings": bookings,
    })))
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AppJson(draft): AppJson<BookingDraft>,
) -> Result<impl IntoResponse, AppError> {
    let booking = bookings::create(&state, draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Booking created successfully! SMS confirmation sent to your mobile.",
            "booking": booking,
        })),
    ))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let booking = bookings::get(&state, &id)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "booking": booking,
    })))
}
