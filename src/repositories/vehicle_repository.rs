use crate::models::vehicle::{AvailabilityStatus, Vehicle};
use crate::utils::errors::AppError;
use sqlx::PgPool;
use uuid::Uuid;
use chrono::Utc;
use rust_decimal::Decimal;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        vehicle_name: String,
        vehicle_type: &str,
        registration_number: String,
        daily_rent_price: Decimal,
        availability_status: &str,
    ) -> Result<Vehicle, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, vehicle_name, vehicle_type, registration_number, daily_rent_price, availability_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(vehicle_name)
        .bind(vehicle_type)
        .bind(registration_number)
        .bind(daily_rent_price)
        .bind(availability_status)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn find_by_registration(
        &self,
        registration_number: &str,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE registration_number = $1")
                .bind(registration_number)
                .fetch_optional(&self.pool)
                .await?;

        Ok(vehicle)
    }

    pub async fn find_all(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(vehicles)
    }

    pub async fn registration_exists(&self, registration_number: &str) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE registration_number = $1)",
        )
        .bind(registration_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn update(
        &self,
        id: Uuid,
        vehicle_name: Option<String>,
        vehicle_type: Option<String>,
        registration_number: Option<String>,
        daily_rent_price: Option<Decimal>,
        availability_status: Option<String>,
    ) -> Result<Vehicle, AppError> {
        // Obtener vehículo actual
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET vehicle_name = $2, vehicle_type = $3, registration_number = $4, daily_rent_price = $5, availability_status = $6, updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(vehicle_name.unwrap_or(current.vehicle_name))
        .bind(vehicle_type.unwrap_or(current.vehicle_type))
        .bind(registration_number.unwrap_or(current.registration_number))
        .bind(daily_rent_price.unwrap_or(current.daily_rent_price))
        .bind(availability_status.unwrap_or(current.availability_status))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let vehicle = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        // Un vehículo con reserva activa no se puede eliminar sin romper
        // la consistencia reserva/vehículo
        if vehicle.availability_status == AvailabilityStatus::Booked.as_str() {
            return Err(AppError::Conflict(
                "El vehículo tiene una reserva activa y no se puede eliminar".to_string(),
            ));
        }

        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
