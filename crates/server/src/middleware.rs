//! Bearer-token gate for everything under `/api` except auth and health.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::ApiError};

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = utils::jwt::verify(&state.config.jwt_secret, token)
        .map_err(|_| ApiError::Unauthorized)?;

    // Handlers can read the caller's identity from extensions.
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
