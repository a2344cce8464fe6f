use crate::dto::auth_dto::ApiResponse;
use crate::dto::user_dto::UserResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::auth::UserRole;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::AppError;
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserController {
    repository: UserRepository,
}

impl UserController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool),
        }
    }

    pub async fn list(
        &self,
        caller: &AuthenticatedUser,
    ) -> Result<ApiResponse<Vec<UserResponse>>, AppError> {
        if caller.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "Se requieren permisos de administrador".to_string(),
            ));
        }

        let users = self.repository.find_all().await?;

        let message = if users.is_empty() {
            "No se encontraron usuarios"
        } else {
            "Usuarios recuperados exitosamente"
        };

        let response = users.into_iter().map(UserResponse::from).collect();

        Ok(ApiResponse::success_with_message(response, message.to_string()))
    }

    pub async fn get_by_id(
        &self,
        caller: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        // Un cliente solo puede consultar su propio perfil
        if caller.role != UserRole::Admin && caller.user_id != id {
            return Err(AppError::Forbidden(
                "No tienes permiso para consultar este usuario".to_string(),
            ));
        }

        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        Ok(ApiResponse::success(UserResponse::from(user)))
    }
}
