pub mod admin;
pub mod booking;
pub mod review;

pub use admin::Admin;
pub use booking::{Booking, BookingStatus, CarType, ServiceType};
pub use review::{RatingBucket, RatingStats, Review};
