use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, CarType, ServiceType};
use crate::services::messaging;
use crate::state::AppState;

/// Raw booking submission from the public form.
#[derive(Debug, Deserialize)]
pub struct BookingDraft {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    #[serde(rename = "carType")]
    pub car_type: Option<String>,
    #[serde(rename = "pickupLocation")]
    pub pickup_location: Option<String>,
    #[serde(rename = "dropLocation")]
    pub drop_location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
}

fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub async fn create(state: &Arc<AppState>, draft: BookingDraft) -> Result<Booking, AppError> {
    let service_type = non_empty(&draft.service_type)
        .and_then(|s| ServiceType::parse(&s))
        .ok_or_else(|| {
            AppError::Validation(
                "All required fields must be filled (mobile number is mandatory)".to_string(),
            )
        })?;

    let (pickup_location, drop_location, travel_date, travel_time, mobile) = match (
        non_empty(&draft.pickup_location),
        non_empty(&draft.drop_location),
        non_empty(&draft.date),
        non_empty(&draft.time),
        non_empty(&draft.mobile),
    ) {
        (Some(pickup), Some(drop), Some(date), Some(time), Some(mobile)) => {
            (pickup, drop, date, time, mobile)
        }
        _ => {
            return Err(AppError::Validation(
                "All required fields must be filled (mobile number is mandatory)".to_string(),
            ))
        }
    };

    if !is_valid_mobile(&mobile) {
        return Err(AppError::Validation(
            "Please provide a valid 10-digit mobile number".to_string(),
        ));
    }

    // Car subtype is only meaningful for car bookings.
    let car_type = match service_type {
        ServiceType::Car => non_empty(&draft.car_type).and_then(|s| CarType::parse(&s)),
        ServiceType::Bus => None,
    };

    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        name: non_empty(&draft.name).unwrap_or_else(|| "Guest".to_string()),
        service_type,
        car_type,
        pickup_location,
        drop_location,
        travel_date,
        travel_time,
        email: non_empty(&draft.email),
        mobile,
        status: BookingStatus::Pending,
        mirrored: false,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_booking(&db, &booking)?;
    }

    tracing::info!(booking_id = %booking.id, service = %booking.service_type.as_str(), "booking created");

    let message = messaging::booking_received_message(&booking);
    spawn_side_effects(Arc::clone(state), booking.clone(), message, MirrorPush::Append);

    Ok(booking)
}

pub fn list(state: &Arc<AppState>) -> Result<Vec<Booking>, AppError> {
    let db = state.db.lock().unwrap();
    Ok(queries::get_all_bookings(&db)?)
}

pub fn get(state: &Arc<AppState>, id: &str) -> Result<Booking, AppError> {
    let db = state.db.lock().unwrap();
    queries::get_booking_by_id(&db, id)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

/// Confirms a pending booking. Idempotent: re-confirming an already-confirmed
/// booking returns it unchanged without resending the SMS or touching the
/// mirror. Returns the booking and whether this call changed it.
pub async fn confirm(state: &Arc<AppState>, id: &str) -> Result<(Booking, bool), AppError> {
    let mut booking = {
        let db = state.db.lock().unwrap();
        let booking = queries::get_booking_by_id(&db, id)?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        match booking.status {
            BookingStatus::Confirmed => return Ok((booking, false)),
            BookingStatus::Cancelled => {
                return Err(AppError::InvalidState(
                    "Cancelled bookings cannot be confirmed".to_string(),
                ))
            }
            BookingStatus::Pending => {}
        }

        queries::update_booking_status(&db, id, BookingStatus::Confirmed)?;
        booking
    };

    booking.status = BookingStatus::Confirmed;
    booking.updated_at = Utc::now().naive_utc();

    tracing::info!(booking_id = %booking.id, "booking confirmed");

    let message = messaging::booking_confirmed_message(&booking);
    spawn_side_effects(Arc::clone(state), booking.clone(), message, MirrorPush::Update);

    Ok((booking, true))
}

/// Hard delete. The mirror row is intentionally left behind so the
/// spreadsheet keeps a historical record.
pub fn delete(state: &Arc<AppState>, id: &str) -> Result<Booking, AppError> {
    let db = state.db.lock().unwrap();
    let booking = queries::get_booking_by_id(&db, id)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
    queries::delete_booking(&db, id)?;

    tracing::info!(booking_id = %id, "booking deleted");
    Ok(booking)
}

/// Pushes every booking to the mirror in one batch replace, then marks them
/// all mirrored. Unlike the per-record side effects this reports failure to
/// the caller instead of swallowing it.
pub async fn sync_all(state: &Arc<AppState>) -> Result<usize, AppError> {
    if !state.mirror.is_configured() {
        return Err(AppError::MirrorUnavailable(
            "Failed to sync bookings. Check Google Sheets configuration.".to_string(),
        ));
    }

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_all_bookings(&db)?
    };

    state.mirror.replace_bookings(&bookings).await.map_err(|e| {
        tracing::error!(error = %e, "booking batch sync failed");
        AppError::MirrorUnavailable(
            "Failed to sync bookings. Check Google Sheets configuration.".to_string(),
        )
    })?;

    {
        let db = state.db.lock().unwrap();
        queries::mark_all_bookings_mirrored(&db)?;
    }

    Ok(bookings.len())
}

enum MirrorPush {
    Append,
    Update,
}

/// Fire-and-forget side effects, dispatched after the primary write commits.
/// Failures are logged; the only observable trace is the mirrored flag
/// staying false until a manual sync.
fn spawn_side_effects(
    state: Arc<AppState>,
    booking: Booking,
    sms_body: String,
    push: MirrorPush,
) {
    tokio::spawn(async move {
        if let Err(e) = state.sms.send_message(&booking.mobile, &sms_body).await {
            tracing::warn!(error = %e, booking_id = %booking.id, "booking SMS failed");
        }

        if !state.mirror.is_configured() {
            return;
        }

        let result = match push {
            MirrorPush::Append => state.mirror.add_booking(&booking).await,
            MirrorPush::Update => state.mirror.update_booking(&booking).await,
        };

        match result {
            Ok(()) => {
                let db = state.db.lock().unwrap();
                if let Err(e) = queries::set_booking_mirrored(&db, &booking.id) {
                    tracing::warn!(error = %e, booking_id = %booking.id, "failed to record mirrored flag");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, booking_id = %booking.id, "booking mirror push failed");
            }
        }
    });
}
