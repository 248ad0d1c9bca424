use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ServiceType;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub customer_name: String,
    pub booking_id: String,
    pub rating: i64,
    pub comment: String,
    pub verified: bool,
    pub verified_by: Option<String>,
    pub verified_at: Option<NaiveDateTime>,
    pub trip_date: String,
    pub service_type: ServiceType,
    pub approved: bool,
    pub mirrored: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Average rating and review count over verified, approved reviews.
#[derive(Debug, Clone, Serialize)]
pub struct RatingStats {
    pub average_rating: f64,
    pub total_reviews: i64,
}

/// One bucket of the rating histogram. Ratings with no reviews are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct RatingBucket {
    pub rating: i64,
    pub count: i64,
}
