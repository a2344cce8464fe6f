use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::booking::Booking;
use crate::models::vehicle::Vehicle;

// Request para crear una reserva. Los campos son opcionales para poder
// responder "campo requerido" por cada ausencia, en vez de un rechazo
// genérico de deserialización.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub rent_start_date: Option<String>,
    pub rent_end_date: Option<String>,
}

// Request para actualizar el estado de una reserva
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: Option<String>,
}

// Snapshot desnormalizado del vehículo al momento de reservar
#[derive(Debug, Serialize)]
pub struct BookingVehicleSnapshot {
    pub vehicle_name: String,
    pub daily_rent_price: Decimal,
}

// Response de reserva
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub rent_start_date: NaiveDate,
    pub rent_end_date: NaiveDate,
    pub total_price: Decimal,
    pub status: String,
    pub vehicle: BookingVehicleSnapshot,
}

impl BookingResponse {
    pub fn from_parts(booking: Booking, vehicle: &Vehicle) -> Self {
        Self {
            id: booking.id,
            customer_id: booking.customer_id,
            vehicle_id: booking.vehicle_id,
            rent_start_date: booking.rent_start_date,
            rent_end_date: booking.rent_end_date,
            total_price: booking.total_price,
            status: booking.status,
            vehicle: BookingVehicleSnapshot {
                vehicle_name: vehicle.vehicle_name.clone(),
                daily_rent_price: vehicle.daily_rent_price,
            },
        }
    }
}

// Vista de cliente en el listado de reservas
#[derive(Debug, Serialize)]
pub struct BookingCustomerView {
    pub name: String,
    pub email: String,
}

// Vista de vehículo en el listado de reservas
#[derive(Debug, Serialize)]
pub struct BookingVehicleView {
    pub vehicle_name: String,
    pub registration_number: String,
}

// Item del listado de reservas, enriquecido con cliente y vehículo
#[derive(Debug, Serialize)]
pub struct BookingListItem {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub rent_start_date: NaiveDate,
    pub rent_end_date: NaiveDate,
    pub total_price: Decimal,
    pub status: String,
    pub customer: BookingCustomerView,
    pub vehicle: BookingVehicleView,
}
