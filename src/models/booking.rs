//! Modelo de Booking
//!
//! Este módulo contiene el struct Booking y la máquina de estados de la
//! reserva. `active` es el estado inicial; `cancelled` y `returned` son
//! terminales y ninguna transición sale de ellos.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use rust_decimal::Decimal;

/// Estado de una reserva
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Active,
    Cancelled,
    Returned,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "active",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Returned => "returned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(BookingStatus::Active),
            "cancelled" => Some(BookingStatus::Cancelled),
            "returned" => Some(BookingStatus::Returned),
            _ => None,
        }
    }

    /// Un estado terminal no admite más transiciones
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Returned)
    }

    pub fn allowed_values() -> &'static str {
        "active, cancelled, returned"
    }
}

/// Booking - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub rent_start_date: NaiveDate,
    pub rent_end_date: NaiveDate,
    pub total_price: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in ["active", "cancelled", "returned"] {
            assert_eq!(BookingStatus::from_str(s).unwrap().as_str(), s);
        }
        assert_eq!(BookingStatus::from_str("pending"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!BookingStatus::Active.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Returned.is_terminal());
    }
}
