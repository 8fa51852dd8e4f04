use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// Liveness plus a database ping.
pub async fn health(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    sqlx::query("SELECT 1").execute(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
