//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y los enums de tipo y disponibilidad.
//! Tipo y disponibilidad se almacenan como texto; los enums cerrados viven en
//! el código y los valores desconocidos se rechazan en el borde.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use rust_decimal::Decimal;

/// Tipo de vehículo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleType {
    Car,
    Bike,
    Van,
    Suv,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Bike => "bike",
            VehicleType::Van => "van",
            VehicleType::Suv => "suv",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "car" => Some(VehicleType::Car),
            "bike" => Some(VehicleType::Bike),
            "van" => Some(VehicleType::Van),
            "suv" => Some(VehicleType::Suv),
            _ => None,
        }
    }

    pub fn allowed_values() -> &'static str {
        "car, bike, van, suv"
    }
}

/// Estado de disponibilidad del vehículo
///
/// Invariante del sistema: un vehículo está `booked` si y solo si tiene
/// exactamente una reserva activa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    Available,
    Booked,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::Booked => "booked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(AvailabilityStatus::Available),
            "booked" => Some(AvailabilityStatus::Booked),
            _ => None,
        }
    }

    pub fn allowed_values() -> &'static str {
        "available, booked"
    }
}

/// Vehicle - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub vehicle_name: String,
    pub vehicle_type: String,
    pub registration_number: String,
    pub daily_rent_price: Decimal,
    pub availability_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn is_booked(&self) -> bool {
        self.availability_status == AvailabilityStatus::Booked.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_type_round_trip() {
        for s in ["car", "bike", "van", "suv"] {
            assert_eq!(VehicleType::from_str(s).unwrap().as_str(), s);
        }
        assert_eq!(VehicleType::from_str("truck"), None);
    }

    #[test]
    fn test_availability_status_round_trip() {
        assert_eq!(
            AvailabilityStatus::from_str("available"),
            Some(AvailabilityStatus::Available)
        );
        assert_eq!(
            AvailabilityStatus::from_str("booked"),
            Some(AvailabilityStatus::Booked)
        );
        assert_eq!(AvailabilityStatus::from_str("maintenance"), None);
    }
}
