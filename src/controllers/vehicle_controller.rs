use crate::dto::auth_dto::ApiResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::auth::UserRole;
use crate::models::vehicle::{AvailabilityStatus, VehicleType};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::AppError;
use crate::utils::validation::{
    validate_non_negative, validate_not_empty, validate_registration_number,
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct VehicleController {
    repository: VehicleRepository,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        request: CreateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        if caller.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "Se requieren permisos de administrador".to_string(),
            ));
        }

        // Validar campos
        if validate_not_empty(&request.vehicle_name).is_err() {
            return Err(AppError::Validation("vehicle_name es requerido".to_string()));
        }

        if validate_registration_number(&request.registration_number).is_err() {
            return Err(AppError::Validation(
                "registration_number inválido".to_string(),
            ));
        }

        let vehicle_type = VehicleType::from_str(&request.vehicle_type).ok_or_else(|| {
            AppError::Validation(format!(
                "type debe ser uno de: {}",
                VehicleType::allowed_values()
            ))
        })?;

        let availability_status = AvailabilityStatus::from_str(&request.availability_status)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "availability_status debe ser uno de: {}",
                    AvailabilityStatus::allowed_values()
                ))
            })?;

        if validate_non_negative(request.daily_rent_price).is_err() {
            return Err(AppError::Validation(
                "daily_rent_price debe ser un número no negativo".to_string(),
            ));
        }

        // Verificar que la matrícula no exista
        if self
            .repository
            .registration_exists(&request.registration_number)
            .await?
        {
            return Err(AppError::Conflict(
                "La matrícula ya está registrada".to_string(),
            ));
        }

        let vehicle = self
            .repository
            .create(
                request.vehicle_name,
                vehicle_type.as_str(),
                request.registration_number,
                request.daily_rent_price,
                availability_status.as_str(),
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehículo creado exitosamente".to_string(),
        ))
    }

    pub async fn list(&self) -> Result<ApiResponse<Vec<VehicleResponse>>, AppError> {
        let vehicles = self.repository.find_all().await?;

        let message = if vehicles.is_empty() {
            "No se encontraron vehículos"
        } else {
            "Vehículos recuperados exitosamente"
        };

        let response = vehicles.into_iter().map(VehicleResponse::from).collect();

        Ok(ApiResponse::success_with_message(response, message.to_string()))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        Ok(ApiResponse::success(VehicleResponse::from(vehicle)))
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        if caller.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "Se requieren permisos de administrador".to_string(),
            ));
        }

        // Validar solo los campos presentes
        if let Some(ref vehicle_name) = request.vehicle_name {
            if validate_not_empty(vehicle_name).is_err() {
                return Err(AppError::Validation(
                    "vehicle_name no puede estar vacío".to_string(),
                ));
            }
        }

        let vehicle_type = match request.vehicle_type {
            Some(ref raw) => Some(
                VehicleType::from_str(raw)
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "type debe ser uno de: {}",
                            VehicleType::allowed_values()
                        ))
                    })?
                    .as_str()
                    .to_string(),
            ),
            None => None,
        };

        let availability_status = match request.availability_status {
            Some(ref raw) => Some(
                AvailabilityStatus::from_str(raw)
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "availability_status debe ser uno de: {}",
                            AvailabilityStatus::allowed_values()
                        ))
                    })?
                    .as_str()
                    .to_string(),
            ),
            None => None,
        };

        if let Some(price) = request.daily_rent_price {
            if validate_non_negative(price).is_err() {
                return Err(AppError::Validation(
                    "daily_rent_price debe ser un número no negativo".to_string(),
                ));
            }
        }

        // La matrícula nueva no puede pertenecer a otro vehículo
        if let Some(ref registration_number) = request.registration_number {
            if validate_registration_number(registration_number).is_err() {
                return Err(AppError::Validation(
                    "registration_number inválido".to_string(),
                ));
            }

            if let Some(existing) = self
                .repository
                .find_by_registration(registration_number)
                .await?
            {
                if existing.id != id {
                    return Err(AppError::Conflict(
                        "La matrícula ya está registrada".to_string(),
                    ));
                }
            }
        }

        let vehicle = self
            .repository
            .update(
                id,
                request.vehicle_name,
                vehicle_type,
                request.registration_number,
                request.daily_rent_price,
                availability_status,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehículo actualizado exitosamente".to_string(),
        ))
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: Uuid) -> Result<(), AppError> {
        if caller.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "Se requieren permisos de administrador".to_string(),
            ));
        }

        self.repository.delete(id).await?;

        Ok(())
    }
}
