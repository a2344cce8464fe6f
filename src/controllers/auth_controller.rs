use crate::config::environment::EnvironmentConfig;
use crate::dto::auth_dto::{ApiResponse, RegisterRequest, SigninRequest, SigninResponse};
use crate::dto::user_dto::UserResponse;
use crate::models::auth::UserRole;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};
use crate::utils::validation::{validate_email, validate_not_empty, validate_phone};
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;

pub struct AuthController {
    repository: UserRepository,
    jwt: JwtConfig,
}

impl AuthController {
    pub fn new(pool: PgPool, config: &EnvironmentConfig) -> Self {
        Self {
            repository: UserRepository::new(pool),
            jwt: JwtConfig::from(config),
        }
    }

    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        // Validar campos
        if validate_not_empty(&request.name).is_err() {
            return Err(AppError::Validation("name es requerido".to_string()));
        }

        if validate_email(&request.email).is_err() {
            return Err(AppError::Validation("Email inválido".to_string()));
        }

        if request.email != request.email.to_lowercase() {
            return Err(AppError::Validation(
                "El email debe estar en minúsculas".to_string(),
            ));
        }

        if request.password.len() < 6 {
            return Err(AppError::Validation(
                "La contraseña debe tener al menos 6 caracteres".to_string(),
            ));
        }

        if validate_phone(&request.phone).is_err() {
            return Err(AppError::Validation("Teléfono inválido".to_string()));
        }

        // Verificar que el email no exista
        if self.repository.email_exists(&request.email).await? {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }

        // Hash de la contraseña
        let password_hash = hash(&request.password, DEFAULT_COST)
            .map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))?;

        // Todo registro nuevo entra como cliente; los administradores se
        // crean por fuera de la API pública
        let user = self
            .repository
            .create(
                request.name,
                request.email,
                password_hash,
                request.phone,
                UserRole::Customer.as_str(),
            )
            .await?;

        log::info!("👤 Usuario {} registrado", user.id);

        Ok(ApiResponse::success_with_message(
            UserResponse::from(user),
            "Registro exitoso".to_string(),
        ))
    }

    pub async fn signin(
        &self,
        request: SigninRequest,
    ) -> Result<ApiResponse<SigninResponse>, AppError> {
        // Buscar usuario por email; el mensaje no distingue email
        // desconocido de contraseña incorrecta
        let user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Credenciales inválidas".to_string()))?;

        // Verificar contraseña
        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(format!("Error verifying password: {}", e)))?;

        if !valid {
            return Err(AppError::Unauthorized("Credenciales inválidas".to_string()));
        }

        // El rol almacenado debe ser uno de los conocidos antes de emitir token
        let role = UserRole::from_str(&user.role)
            .ok_or_else(|| AppError::Internal(format!("Rol desconocido: {}", user.role)))?;

        let token = generate_token(user.id, &user.email, role.as_str(), &self.jwt)?;

        Ok(ApiResponse::success_with_message(
            SigninResponse {
                token,
                user: UserResponse::from(user),
            },
            "Login exitoso".to_string(),
        ))
    }
}
