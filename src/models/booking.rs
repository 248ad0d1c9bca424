use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub name: String,
    pub service_type: ServiceType,
    pub car_type: Option<CarType>,
    pub pickup_location: String,
    pub drop_location: String,
    pub travel_date: String,
    pub travel_time: String,
    pub email: Option<String>,
    pub mobile: String,
    pub status: BookingStatus,
    pub mirrored: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Car,
    Bus,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Car => "car",
            ServiceType::Bus => "bus",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "car" => Some(ServiceType::Car),
            "bus" => Some(ServiceType::Bus),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CarType {
    Sedan,
    Suv,
    Premium,
}

impl CarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarType::Sedan => "sedan",
            CarType::Suv => "suv",
            CarType::Premium => "premium",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sedan" => Some(CarType::Sedan),
            "suv" => Some(CarType::Suv),
            "premium" => Some(CarType::Premium),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }
}
