use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingStatus, RatingBucket, RatingStats, Review};
use crate::state::AppState;

/// Raw review submission from the public form.
#[derive(Debug, Deserialize)]
pub struct ReviewDraft {
    #[serde(rename = "customerName")]
    pub customer_name: Option<String>,
    #[serde(rename = "bookingId")]
    pub booking_id: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// Case-insensitive containment in either direction. A review is
/// auto-verified when the submitted name and the booking's stored name share
/// a substring relationship; empty names never match.
fn names_match(booking_name: &str, customer_name: &str) -> bool {
    let booking_name = booking_name.trim().to_lowercase();
    let customer_name = customer_name.trim().to_lowercase();

    if booking_name.is_empty() || customer_name.is_empty() {
        return false;
    }

    booking_name.contains(&customer_name) || customer_name.contains(&booking_name)
}

pub async fn submit(
    state: &Arc<AppState>,
    draft: ReviewDraft,
) -> Result<(Review, bool), AppError> {
    let booking_id = draft
        .booking_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::NotFound("Booking not found. Please provide a valid booking ID.".to_string())
        })?
        .to_string();

    let customer_name = draft
        .customer_name
        .as_deref()
        .map(str::trim)
        .unwrap_or("")
        .to_string();

    let review = {
        let db = state.db.lock().unwrap();

        let booking = queries::get_booking_by_id(&db, &booking_id)?.ok_or_else(|| {
            AppError::NotFound("Booking not found. Please provide a valid booking ID.".to_string())
        })?;

        if booking.status != BookingStatus::Confirmed {
            return Err(AppError::InvalidState(
                "Reviews can only be submitted for confirmed bookings.".to_string(),
            ));
        }

        if queries::review_exists_for_booking(&db, &booking_id)? {
            return Err(AppError::Duplicate(
                "You have already submitted a review for this booking.".to_string(),
            ));
        }

        let name_match = names_match(&booking.name, &customer_name);

        let rating = match draft.rating {
            Some(r) if (1..=5).contains(&r) => r,
            _ => {
                return Err(AppError::Validation(
                    "Rating must be a whole number between 1 and 5".to_string(),
                ))
            }
        };

        let comment = draft.comment.as_deref().map(str::trim).unwrap_or("");
        if comment.chars().count() < 10 || comment.chars().count() > 1000 {
            return Err(AppError::Validation(
                "Comment must be between 10 and 1000 characters".to_string(),
            ));
        }

        if customer_name.chars().count() < 2 || customer_name.chars().count() > 100 {
            return Err(AppError::Validation(
                "Name must be between 2 and 100 characters".to_string(),
            ));
        }

        let now = Utc::now().naive_utc();
        let review = Review {
            id: Uuid::new_v4().to_string(),
            customer_name,
            booking_id,
            rating,
            comment: comment.to_string(),
            verified: name_match,
            // Auto-verification is not attributed to an admin.
            verified_by: None,
            verified_at: None,
            trip_date: booking.travel_date.clone(),
            service_type: booking.service_type,
            approved: true,
            mirrored: false,
            created_at: now,
            updated_at: now,
        };

        queries::create_review(&db, &review)?;
        review
    };

    tracing::info!(review_id = %review.id, verified = review.verified, "review submitted");

    spawn_mirror_push(Arc::clone(state), review.clone());

    let auto_verified = review.verified;
    Ok((review, auto_verified))
}

pub fn list_public(
    state: &Arc<AppState>,
    only_verified: bool,
    limit: i64,
) -> Result<(Vec<Review>, RatingStats, Vec<RatingBucket>), AppError> {
    let db = state.db.lock().unwrap();
    let reviews = queries::get_public_reviews(&db, only_verified, limit)?;
    let stats = queries::get_rating_stats(&db)?;
    let distribution = queries::get_rating_distribution(&db)?;
    Ok((reviews, stats, distribution))
}

pub fn list_all(
    state: &Arc<AppState>,
) -> Result<(Vec<Review>, RatingStats), AppError> {
    let db = state.db.lock().unwrap();
    let reviews = queries::get_all_reviews(&db)?;
    let stats = queries::get_rating_stats(&db)?;
    Ok((reviews, stats))
}

pub fn stats(state: &Arc<AppState>) -> Result<(RatingStats, Vec<RatingBucket>), AppError> {
    let db = state.db.lock().unwrap();
    let stats = queries::get_rating_stats(&db)?;
    let distribution = queries::get_rating_distribution(&db)?;
    Ok((stats, distribution))
}

pub async fn verify_by_admin(
    state: &Arc<AppState>,
    review_id: &str,
    admin_id: &str,
) -> Result<Review, AppError> {
    let review = {
        let db = state.db.lock().unwrap();

        let review = queries::get_review_by_id(&db, review_id)?
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

        if review.verified {
            return Err(AppError::AlreadyVerified(
                "Review is already verified".to_string(),
            ));
        }

        queries::verify_review(&db, review_id, admin_id)?;
        queries::get_review_by_id(&db, review_id)?
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?
    };

    tracing::info!(review_id = %review.id, admin_id = %admin_id, "review verified by admin");

    // A review that never made it to the sheet gets another chance now.
    if !review.mirrored {
        spawn_mirror_push(Arc::clone(state), review.clone());
    }

    Ok(review)
}

pub fn delete_by_admin(state: &Arc<AppState>, review_id: &str) -> Result<(), AppError> {
    let db = state.db.lock().unwrap();
    if !queries::delete_review(&db, review_id)? {
        return Err(AppError::NotFound("Review not found".to_string()));
    }

    tracing::info!(review_id = %review_id, "review deleted");
    Ok(())
}

/// Mirrors every verified, approved review in one batch replace and marks
/// them mirrored. Returns the number of reviews pushed.
pub async fn sync_all_verified(state: &Arc<AppState>) -> Result<usize, AppError> {
    if !state.mirror.is_configured() {
        return Err(AppError::MirrorUnavailable(
            "Failed to sync reviews. Check Google Sheets configuration.".to_string(),
        ));
    }

    let reviews = {
        let db = state.db.lock().unwrap();
        queries::get_verified_reviews(&db)?
    };

    if reviews.is_empty() {
        return Ok(0);
    }

    state.mirror.replace_reviews(&reviews).await.map_err(|e| {
        tracing::error!(error = %e, "review batch sync failed");
        AppError::MirrorUnavailable(
            "Failed to sync reviews. Check Google Sheets configuration.".to_string(),
        )
    })?;

    {
        let db = state.db.lock().unwrap();
        queries::mark_verified_reviews_mirrored(&db)?;
    }

    Ok(reviews.len())
}

/// Best-effort mirror append, dispatched after the primary write commits.
fn spawn_mirror_push(state: Arc<AppState>, review: Review) {
    tokio::spawn(async move {
        if !state.mirror.is_configured() {
            return;
        }

        match state.mirror.add_review(&review).await {
            Ok(()) => {
                let db = state.db.lock().unwrap();
                if let Err(e) = queries::set_review_mirrored(&db, &review.id) {
                    tracing::warn!(error = %e, review_id = %review.id, "failed to record mirrored flag");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, review_id = %review.id, "review mirror push failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_name_matches_either_direction() {
        assert!(names_match("Priya Sharma", "priya"));
        assert!(names_match("priya", "Priya Sharma"));
        assert!(names_match("PRIYA SHARMA", "Priya Sharma"));
    }

    #[test]
    fn unrelated_names_do_not_match() {
        assert!(!names_match("Guest", "Priya"));
        assert!(!names_match("Rahul", "Priya"));
    }

    #[test]
    fn empty_names_never_match() {
        assert!(!names_match("", "Priya"));
        assert!(!names_match("Priya", ""));
        assert!(!names_match("", ""));
        assert!(!names_match("   ", "Priya"));
    }
}
