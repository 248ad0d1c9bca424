use async_trait::async_trait;

use crate::models::Booking;

/// Outbound SMS-style notification. Best effort: callers log failures and
/// never let them fail the primary operation.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    async fn send_message(&self, to: &str, body: &str) -> anyhow::Result<()>;
}

/// Default provider: writes the message to the log instead of a gateway.
/// Delivery through a real SMS service plugs in behind the same trait.
pub struct LogSmsProvider;

#[async_trait]
impl SmsProvider for LogSmsProvider {
    async fn send_message(&self, to: &str, body: &str) -> anyhow::Result<()> {
        tracing::info!(to = %to, body = %body, "SMS sent");
        Ok(())
    }
}

pub fn booking_received_message(booking: &Booking) -> String {
    format!(
        "Dear Customer, your {} booking from {} to {} on {} at {} has been received. \
         Booking ID: {}. Thank you for choosing BossCars!",
        booking.service_type.as_str(),
        booking.pickup_location,
        booking.drop_location,
        booking.travel_date,
        booking.travel_time,
        booking.id,
    )
}

pub fn booking_confirmed_message(booking: &Booking) -> String {
    format!(
        "Dear Customer, your {} booking (ID: {}) from {} to {} on {} at {} has been CONFIRMED! \
         Thank you for choosing BossCars!",
        booking.service_type.as_str(),
        booking.id,
        booking.pickup_location,
        booking.drop_location,
        booking.travel_date,
        booking.travel_time,
    )
}
