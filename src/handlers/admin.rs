use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::handlers::reviews::stats_json;
use crate::services::auth::{self, AdminClaims, LoginRequest, SignupRequest};
use crate::services::{bookings, reviews};
use crate::state::AppState;

fn authorize(state: &Arc<AppState>, headers: &HeaderMap) -> Result<AdminClaims, AppError> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Auth("Authorization token required".to_string()))?;

    auth::verify_token(&state.config.jwt_secret, token)
}

// ── Identity ──

// POST /api/admin/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let admin = auth::signup(&state, req)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Admin account created successfully! You can now login.",
            "admin": {
                "email": admin.email,
                "name": admin.name,
                "role": admin.role,
            },
        })),
    ))
}

// POST /api/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (token, admin) = auth::login(&state, req)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "token": token,
        "email": admin.email,
        "name": admin.name,
        "role": admin.role,
        "message": "Login successful",
    })))
}

// POST /api/admin/logout
pub async fn logout() -> Json<serde_json::Value> {
    // Sessions are stateless tokens; logout is a client-side discard.
    Json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully",
    }))
}

// GET /api/admin/check-admin
pub async fn check_admin(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let exists = auth::check_exists(&state)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "adminExists": exists,
    })))
}

// GET /api/admin/verify
pub async fn verify_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = authorize(&state, &headers)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "admin": {
            "email": claims.email,
            "name": claims.name,
            "role": claims.role,
        },
    })))
}

// ── Bookings ──

// GET /api/admin/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&state, &headers)?;
    let bookings = bookings::list(&state)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "bookings": bookings,
    })))
}

// PUT /api/admin/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&state, &headers)?;
    let (booking, changed) = bookings::confirm(&state, &id).await?;

    let message = if changed {
        "Booking confirmed and SMS sent to customer"
    } else {
        "Booking is already confirmed"
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "message": message,
        "booking": booking,
    })))
}

// DELETE /api/admin/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&state, &headers)?;
    let booking = bookings::delete(&state, &id)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Booking deleted",
        "booking": booking,
    })))
}

// POST /api/admin/sync-sheets
pub async fn sync_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&state, &headers)?;
    let count = bookings::sync_all(&state).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Successfully synced {count} bookings to Google Sheets"),
    })))
}

// ── Reviews ──

// GET /api/admin/reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&state, &headers)?;
    let (reviews, stats) = reviews::list_all(&state)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "reviews": reviews,
        "stats": stats_json(&stats, None),
    })))
}

// PUT /api/admin/reviews/:id/verify
pub async fn verify_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = authorize(&state, &headers)?;
    let review = reviews::verify_by_admin(&state, &id, &claims.sub).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Review verified successfully",
        "review": review,
    })))
}

// DELETE /api/admin/reviews/:id
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&state, &headers)?;
    reviews::delete_by_admin(&state, &id)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Review deleted successfully",
    })))
}

// POST /api/admin/sync-reviews
pub async fn sync_reviews(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    authorize(&state, &headers)?;
    let count = reviews::sync_all_verified(&state).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Successfully synced {count} reviews to Google Sheets"),
        "count": count,
    })))
}
