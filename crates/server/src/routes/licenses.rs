use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::license::{CreateLicense, License, LicenseWithClient, UpdateLicense};
use serde::Deserialize;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LicenseListParams {
    #[serde(rename = "clienteId", alias = "cliente_id")]
    pub cliente_id: Option<i64>,
}

pub async fn list_licenses(
    State(state): State<AppState>,
    Query(params): Query<LicenseListParams>,
) -> Result<ResponseJson<ApiResponse<Vec<LicenseWithClient>>>, ApiError> {
    let licenses = License::find_all(&state.db.pool, params.cliente_id).await?;
    Ok(ResponseJson(ApiResponse::success(licenses)))
}

pub async fn create_license(
    State(state): State<AppState>,
    Json(payload): Json<CreateLicense>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<License>>), ApiError> {
    let license = License::create(&state.db.pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(license))))
}

pub async fn get_license(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<LicenseWithClient>>, ApiError> {
    let license = License::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("licença"))?;
    Ok(ResponseJson(ApiResponse::success(license)))
}

pub async fn update_license(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLicense>,
) -> Result<ResponseJson<ApiResponse<License>>, ApiError> {
    let license = License::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(license)))
}

pub async fn delete_license(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = License::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("licença"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/licenses",
        Router::new()
            .route("/", get(list_licenses).post(create_license))
            .route(
                "/{id}",
                get(get_license).put(update_license).delete(delete_license),
            ),
    )
}
