use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // public booking endpoints
        .route(
            "/api/bookings",
            get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
        )
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        // public review endpoints
        .route(
            "/api/reviews",
            get(handlers::reviews::list_reviews).post(handlers::reviews::submit_review),
        )
        .route("/api/reviews/stats", get(handlers::reviews::review_stats))
        // admin identity
        .route("/api/admin/signup", post(handlers::admin::signup))
        .route("/api/admin/login", post(handlers::admin::login))
        .route("/api/admin/logout", post(handlers::admin::logout))
        .route("/api/admin/check-admin", get(handlers::admin::check_admin))
        .route("/api/admin/verify", get(handlers::admin::verify_session))
        // admin booking management
        .route("/api/admin/bookings", get(handlers::admin::list_bookings))
        .route(
            "/api/admin/bookings/:id/confirm",
            put(handlers::admin::confirm_booking),
        )
        .route(
            "/api/admin/bookings/:id",
            delete(handlers::admin::delete_booking),
        )
        .route("/api/admin/sync-sheets", post(handlers::admin::sync_bookings))
        // admin review moderation
        .route("/api/admin/reviews", get(handlers::admin::list_reviews))
        .route(
            "/api/admin/reviews/:id/verify",
            put(handlers::admin::verify_review),
        )
        .route(
            "/api/admin/reviews/:id",
            delete(handlers::admin::delete_review),
        )
        .route("/api/admin/sync-reviews", post(handlers::admin::sync_reviews))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
