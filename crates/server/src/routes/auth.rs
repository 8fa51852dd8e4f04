use axum::{Json, Router, extract::State, response::Json as ResponseJson, routing::post};
use services::services::auth::{AuthService, AuthSession, LoginRequest, RegisterRequest};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<ResponseJson<ApiResponse<AuthSession>>, ApiError> {
    let session =
        AuthService::register(&state.db.pool, &state.config.jwt_secret, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(session)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<AuthSession>>, ApiError> {
    let session = AuthService::login(&state.db.pool, &state.config.jwt_secret, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(session)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/auth",
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login)),
    )
}
