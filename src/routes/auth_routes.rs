use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{ApiResponse, RegisterRequest, SigninRequest, SigninResponse};
use crate::dto::user_dto::UserResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

async fn signup(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let controller = AuthController::new(state.pool.clone(), &state.config);
    let response = controller.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SigninRequest>,
) -> Result<Json<ApiResponse<SigninResponse>>, AppError> {
    let controller = AuthController::new(state.pool.clone(), &state.config);
    let response = controller.signin(request).await?;
    Ok(Json(response))
}
