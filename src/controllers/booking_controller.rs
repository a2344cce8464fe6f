//! Controlador de reservas
//!
//! Motor del ciclo de vida de la reserva: valida la solicitud, calcula el
//! precio, crea la reserva y conduce las transiciones de estado manteniendo
//! la disponibilidad del vehículo consistente con las reservas activas.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::ApiResponse;
use crate::dto::booking_dto::{
    BookingCustomerView, BookingListItem, BookingResponse, BookingVehicleView,
    CreateBookingRequest, UpdateBookingStatusRequest,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::auth::UserRole;
use crate::models::booking::BookingStatus;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::AppError;
use crate::utils::validation::validate_date;

/// Días de alquiler entre dos fechas de calendario
fn rental_duration_days(rent_start_date: NaiveDate, rent_end_date: NaiveDate) -> i64 {
    (rent_end_date - rent_start_date).num_days()
}

/// Precio total del alquiler: tarifa diaria por días de duración.
/// Queda fijado al crear la reserva; cambios posteriores de tarifa no lo
/// recalculan.
fn compute_total_price(daily_rent_price: Decimal, duration_days: i64) -> Decimal {
    daily_rent_price * Decimal::from(duration_days)
}

/// Verificar una transición de estado solicitada.
///
/// Reglas:
/// - una reserva en estado terminal no admite más transiciones
/// - pedir `active` sobre una reserva activa es un no-op y se rechaza
/// - un caller que no es admin ni dueño de la reserva se rechaza antes de
///   las reglas por rol
/// - solo un administrador marca `returned`; solo el cliente dueño marca
///   `cancelled`
/// - la cancelación solo procede antes de la fecha de inicio del alquiler;
///   la devolución no tiene restricción de fecha
fn authorize_transition(
    current: &BookingStatus,
    requested: &BookingStatus,
    caller_role: &UserRole,
    caller_owns_booking: bool,
    today: NaiveDate,
    rent_start_date: NaiveDate,
) -> Result<(), AppError> {
    if current.is_terminal() {
        return Err(AppError::Conflict(
            "La reserva ya fue cancelada o devuelta".to_string(),
        ));
    }

    if *requested == BookingStatus::Active {
        return Err(AppError::Conflict("La reserva ya está activa".to_string()));
    }

    if *caller_role != UserRole::Admin && !caller_owns_booking {
        return Err(AppError::Forbidden(
            "No tienes permiso para modificar esta reserva".to_string(),
        ));
    }

    if *requested == BookingStatus::Returned && *caller_role != UserRole::Admin {
        return Err(AppError::Forbidden(
            "Solo un administrador puede marcar la devolución".to_string(),
        ));
    }

    if *requested == BookingStatus::Cancelled {
        if *caller_role != UserRole::Customer {
            return Err(AppError::Forbidden(
                "Solo el cliente dueño puede cancelar la reserva".to_string(),
            ));
        }

        if today >= rent_start_date {
            return Err(AppError::Conflict(
                "La reserva ya no se puede cancelar: el período de alquiler ya comenzó"
                    .to_string(),
            ));
        }
    }

    Ok(())
}

pub struct BookingController {
    bookings: BookingRepository,
    vehicles: VehicleRepository,
    users: UserRepository,
}

impl BookingController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            bookings: BookingRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        // Presencia de campos
        let customer_id = request
            .customer_id
            .ok_or_else(|| AppError::Validation("customer_id es requerido".to_string()))?;
        let vehicle_id = request
            .vehicle_id
            .ok_or_else(|| AppError::Validation("vehicle_id es requerido".to_string()))?;
        let rent_start_raw = request
            .rent_start_date
            .ok_or_else(|| AppError::Validation("rent_start_date es requerido".to_string()))?;
        let rent_end_raw = request
            .rent_end_date
            .ok_or_else(|| AppError::Validation("rent_end_date es requerido".to_string()))?;

        // El cliente debe existir y no puede ser un administrador
        let customer = self
            .users
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        let customer_role = UserRole::from_str(&customer.role).ok_or_else(|| {
            AppError::Validation(format!("Rol de usuario desconocido: {}", customer.role))
        })?;

        if customer_role == UserRole::Admin {
            return Err(AppError::Validation(
                "Un usuario administrador no puede ser el arrendatario".to_string(),
            ));
        }

        // Un cliente solo puede reservar para sí mismo
        if caller.role != UserRole::Admin && caller.user_id != customer.id {
            return Err(AppError::Forbidden(
                "Solo puedes crear reservas para tu propia cuenta".to_string(),
            ));
        }

        // Fechas de calendario válidas, con la hora descartada
        let rent_start_date = validate_date(&rent_start_raw).map_err(|_| {
            AppError::Validation("rent_start_date no es una fecha válida".to_string())
        })?;
        let rent_end_date = validate_date(&rent_end_raw).map_err(|_| {
            AppError::Validation("rent_end_date no es una fecha válida".to_string())
        })?;

        let duration_days = rental_duration_days(rent_start_date, rent_end_date);
        if duration_days <= 0 {
            return Err(AppError::Validation(
                "rent_end_date debe ser posterior a rent_start_date".to_string(),
            ));
        }

        // El vehículo debe existir y estar disponible
        let vehicle = self
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        if vehicle.is_booked() {
            return Err(AppError::Conflict("El vehículo ya está reservado".to_string()));
        }

        let total_price = compute_total_price(vehicle.daily_rent_price, duration_days);

        // Alta de la reserva + transición del vehículo a `booked` como unidad
        // atómica; la disponibilidad se re-verifica dentro de la transacción
        let booking = self
            .bookings
            .create_and_reserve(
                customer.id,
                vehicle.id,
                rent_start_date,
                rent_end_date,
                total_price,
            )
            .await?;

        log::info!(
            "📅 Reserva {} creada para el vehículo {}",
            booking.id,
            vehicle.id
        );

        Ok(ApiResponse::success_with_message(
            BookingResponse::from_parts(booking, &vehicle),
            "Reserva creada exitosamente".to_string(),
        ))
    }

    pub async fn list(
        &self,
        caller: &AuthenticatedUser,
    ) -> Result<ApiResponse<Vec<BookingListItem>>, AppError> {
        let rows = match caller.role {
            UserRole::Admin => self.bookings.find_all_detailed().await?,
            UserRole::Customer => {
                self.bookings
                    .find_detailed_by_customer(caller.user_id)
                    .await?
            }
        };

        let message = if rows.is_empty() {
            "No se encontraron reservas"
        } else {
            "Reservas recuperadas exitosamente"
        };

        let items = rows
            .into_iter()
            .map(|row| BookingListItem {
                id: row.id,
                customer_id: row.customer_id,
                vehicle_id: row.vehicle_id,
                rent_start_date: row.rent_start_date,
                rent_end_date: row.rent_end_date,
                total_price: row.total_price,
                status: row.status,
                customer: BookingCustomerView {
                    name: row.customer_name,
                    email: row.customer_email,
                },
                vehicle: BookingVehicleView {
                    vehicle_name: row.vehicle_name,
                    registration_number: row.registration_number,
                },
            })
            .collect();

        Ok(ApiResponse::success_with_message(items, message.to_string()))
    }

    pub async fn update_status(
        &self,
        caller: &AuthenticatedUser,
        booking_id: Uuid,
        request: UpdateBookingStatusRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        let current = BookingStatus::from_str(&booking.status).ok_or_else(|| {
            AppError::Internal(format!("Estado de reserva desconocido: {}", booking.status))
        })?;

        // Una reserva cerrada se rechaza antes de mirar el estado solicitado
        if current.is_terminal() {
            return Err(AppError::Conflict(
                "La reserva ya fue cancelada o devuelta".to_string(),
            ));
        }

        let status_raw = request
            .status
            .ok_or_else(|| AppError::Validation("status es requerido".to_string()))?;

        let requested = BookingStatus::from_str(&status_raw).ok_or_else(|| {
            AppError::Validation(format!(
                "status inválido. Los valores permitidos son: {}",
                BookingStatus::allowed_values()
            ))
        })?;

        let caller_owns_booking = booking.customer_id == caller.user_id;
        let today = Utc::now().date_naive();

        authorize_transition(
            &current,
            &requested,
            &caller.role,
            caller_owns_booking,
            today,
            booking.rent_start_date,
        )?;

        // Transición + liberación del vehículo como unidad atómica; el estado
        // de la reserva se re-verifica bajo el lock de la transacción
        let updated = self
            .bookings
            .transition_to_terminal(booking_id, &requested)
            .await?;

        let vehicle = self
            .vehicles
            .find_by_id(updated.vehicle_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal("El vehículo de la reserva no existe".to_string())
            })?;

        log::info!("🔄 Reserva {} -> {}", updated.id, updated.status);

        Ok(ApiResponse::success_with_message(
            BookingResponse::from_parts(updated, &vehicle),
            "Estado de la reserva actualizado exitosamente".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rental_duration_days() {
        assert_eq!(
            rental_duration_days(date(2024, 1, 1), date(2024, 1, 4)),
            3
        );
        assert_eq!(
            rental_duration_days(date(2024, 1, 1), date(2024, 1, 2)),
            1
        );
        // Fin igual o anterior al inicio: duración no positiva
        assert_eq!(
            rental_duration_days(date(2024, 1, 4), date(2024, 1, 4)),
            0
        );
        assert_eq!(
            rental_duration_days(date(2024, 1, 4), date(2024, 1, 1)),
            -3
        );
    }

    #[test]
    fn test_compute_total_price() {
        // 100/día por 3 días = 300
        assert_eq!(
            compute_total_price(Decimal::from(100), 3),
            Decimal::from(300)
        );
        assert_eq!(compute_total_price(Decimal::from(0), 5), Decimal::from(0));

        // La aritmética es exacta, sin redondeo binario
        let daily = Decimal::new(4950, 2); // 49.50
        assert_eq!(compute_total_price(daily, 3), Decimal::new(14850, 2)); // 148.50
    }

    #[test]
    fn test_terminal_booking_rejects_any_transition() {
        for current in [BookingStatus::Cancelled, BookingStatus::Returned] {
            for requested in [
                BookingStatus::Active,
                BookingStatus::Cancelled,
                BookingStatus::Returned,
            ] {
                let result = authorize_transition(
                    &current,
                    &requested,
                    &UserRole::Admin,
                    true,
                    date(2024, 1, 1),
                    date(2024, 6, 1),
                );
                assert!(
                    matches!(result, Err(AppError::Conflict(_))),
                    "{:?} -> {:?} debería ser Conflict",
                    current,
                    requested
                );
            }
        }
    }

    #[test]
    fn test_active_to_active_is_rejected_no_op() {
        let result = authorize_transition(
            &BookingStatus::Active,
            &BookingStatus::Active,
            &UserRole::Admin,
            true,
            date(2024, 1, 1),
            date(2024, 6, 1),
        );
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_non_owner_customer_is_rejected_before_role_rules() {
        // Un cliente que no es dueño recibe Forbidden sin importar el estado
        // que pida
        for requested in [BookingStatus::Cancelled, BookingStatus::Returned] {
            let result = authorize_transition(
                &BookingStatus::Active,
                &requested,
                &UserRole::Customer,
                false,
                date(2024, 1, 1),
                date(2024, 6, 1),
            );
            assert!(matches!(result, Err(AppError::Forbidden(_))));
        }
    }

    #[test]
    fn test_only_admin_can_mark_returned() {
        let result = authorize_transition(
            &BookingStatus::Active,
            &BookingStatus::Returned,
            &UserRole::Customer,
            true,
            date(2024, 1, 1),
            date(2024, 6, 1),
        );
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let result = authorize_transition(
            &BookingStatus::Active,
            &BookingStatus::Returned,
            &UserRole::Admin,
            false,
            date(2024, 1, 1),
            date(2024, 6, 1),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_only_owning_customer_can_cancel() {
        // El dueño cancela antes del inicio del alquiler
        let result = authorize_transition(
            &BookingStatus::Active,
            &BookingStatus::Cancelled,
            &UserRole::Customer,
            true,
            date(2024, 1, 1),
            date(2024, 6, 1),
        );
        assert!(result.is_ok());

        // Un administrador no cancela reservas ajenas
        let result = authorize_transition(
            &BookingStatus::Active,
            &BookingStatus::Cancelled,
            &UserRole::Admin,
            false,
            date(2024, 1, 1),
            date(2024, 6, 1),
        );
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_cancellation_blocked_on_or_after_start_date() {
        // El día de inicio ya es tarde para cancelar
        let result = authorize_transition(
            &BookingStatus::Active,
            &BookingStatus::Cancelled,
            &UserRole::Customer,
            true,
            date(2024, 6, 1),
            date(2024, 6, 1),
        );
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let result = authorize_transition(
            &BookingStatus::Active,
            &BookingStatus::Cancelled,
            &UserRole::Customer,
            true,
            date(2024, 6, 15),
            date(2024, 6, 1),
        );
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_return_allowed_after_start_date() {
        // La devolución no tiene restricción de fecha: lo normal es
        // devolver el vehículo después de iniciado el alquiler
        let result = authorize_transition(
            &BookingStatus::Active,
            &BookingStatus::Returned,
            &UserRole::Admin,
            false,
            date(2024, 6, 15),
            date(2024, 6, 1),
        );
        assert!(result.is_ok());
    }
}
