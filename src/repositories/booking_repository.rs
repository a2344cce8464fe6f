//! Repositorio de reservas
//!
//! Las escrituras que tocan el par reserva/vehículo se ejecutan dentro de
//! una única transacción: la disponibilidad del vehículo y la existencia de
//! una reserva activa nunca pueden observarse desincronizadas.

use crate::models::booking::{Booking, BookingStatus};
use crate::models::vehicle::AvailabilityStatus;
use crate::utils::errors::AppError;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

/// Fila del listado de reservas con los datos desnormalizados
/// de cliente y vehículo
#[derive(Debug, FromRow)]
pub struct BookingDetailsRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub rent_start_date: NaiveDate,
    pub rent_end_date: NaiveDate,
    pub total_price: Decimal,
    pub status: String,
    pub customer_name: String,
    pub customer_email: String,
    pub vehicle_name: String,
    pub registration_number: String,
}

const DETAILED_SELECT: &str = r#"
    SELECT b.id, b.customer_id, b.vehicle_id, b.rent_start_date, b.rent_end_date,
           b.total_price, b.status,
           u.name AS customer_name, u.email AS customer_email,
           v.vehicle_name, v.registration_number
    FROM bookings b
    JOIN users u ON u.id = b.customer_id
    JOIN vehicles v ON v.id = b.vehicle_id
"#;

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insertar la reserva y marcar el vehículo como `booked` en una sola
    /// transacción.
    ///
    /// La transición de disponibilidad es un compare-and-swap sobre el estado
    /// actual: de dos creaciones concurrentes sobre el mismo vehículo solo una
    /// puede ganar; la otra recibe `Conflict` sin dejar fila de reserva.
    pub async fn create_and_reserve(
        &self,
        customer_id: Uuid,
        vehicle_id: Uuid,
        rent_start_date: NaiveDate,
        rent_end_date: NaiveDate,
        total_price: Decimal,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let reserved = sqlx::query(
            "UPDATE vehicles SET availability_status = $2, updated_at = $3 WHERE id = $1 AND availability_status = $4",
        )
        .bind(vehicle_id)
        .bind(AvailabilityStatus::Booked.as_str())
        .bind(Utc::now())
        .bind(AvailabilityStatus::Available.as_str())
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() == 0 {
            // Otro caller ganó la transición available -> booked
            return Err(AppError::Conflict("El vehículo ya está reservado".to_string()));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, customer_id, vehicle_id, rent_start_date, rent_end_date, total_price, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(customer_id)
        .bind(vehicle_id)
        .bind(rent_start_date)
        .bind(rent_end_date)
        .bind(total_price)
        .bind(BookingStatus::Active.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(booking)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    pub async fn find_all_detailed(&self) -> Result<Vec<BookingDetailsRow>, AppError> {
        let query = format!("{} ORDER BY b.created_at DESC", DETAILED_SELECT);
        let bookings = sqlx::query_as::<_, BookingDetailsRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }

    pub async fn find_detailed_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<BookingDetailsRow>, AppError> {
        let query = format!(
            "{} WHERE b.customer_id = $1 ORDER BY b.created_at DESC",
            DETAILED_SELECT
        );
        let bookings = sqlx::query_as::<_, BookingDetailsRow>(&query)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }

    /// Aplicar una transición terminal (`cancelled` o `returned`) y liberar
    /// el vehículo, en una sola transacción.
    ///
    /// La fila de la reserva se bloquea con `FOR UPDATE` y su estado se
    /// re-verifica bajo el lock: dos transiciones concurrentes sobre la misma
    /// reserva no pueden aplicarse ambas. Si el vehículo no estaba `booked`,
    /// el par quedó inconsistente y la operación completa se aborta.
    pub async fn transition_to_terminal(
        &self,
        booking_id: Uuid,
        new_status: &BookingStatus,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(booking_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        match BookingStatus::from_str(&current.status) {
            Some(BookingStatus::Active) => {}
            Some(_) => {
                return Err(AppError::Conflict(
                    "La reserva ya fue cancelada o devuelta".to_string(),
                ));
            }
            None => {
                return Err(AppError::Internal(format!(
                    "Estado de reserva desconocido: {}",
                    current.status
                )));
            }
        }

        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(booking_id)
        .bind(new_status.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        // Ambas transiciones terminales devuelven el vehículo al pool
        let released = sqlx::query(
            "UPDATE vehicles SET availability_status = $2, updated_at = $3 WHERE id = $1 AND availability_status = $4",
        )
        .bind(booking.vehicle_id)
        .bind(AvailabilityStatus::Available.as_str())
        .bind(Utc::now())
        .bind(AvailabilityStatus::Booked.as_str())
        .execute(&mut *tx)
        .await?;

        if released.rows_affected() == 0 {
            return Err(AppError::Internal(
                "El vehículo de la reserva no estaba reservado; transición abortada".to_string(),
            ));
        }

        tx.commit().await?;

        Ok(booking)
    }
}
