pub mod auth;
pub mod bookings;
pub mod messaging;
pub mod reviews;
pub mod sheets;
