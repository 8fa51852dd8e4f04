use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::service_type::{CreateServiceType, ServiceType, UpdateServiceType};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn list_service_types(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<ServiceType>>>, ApiError> {
    let service_types = ServiceType::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(service_types)))
}

pub async fn create_service_type(
    State(state): State<AppState>,
    Json(payload): Json<CreateServiceType>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<ServiceType>>), ApiError> {
    let service_type = ServiceType::create(&state.db.pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(service_type)),
    ))
}

pub async fn get_service_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<ServiceType>>, ApiError> {
    let service_type = ServiceType::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("tipo de serviço"))?;
    Ok(ResponseJson(ApiResponse::success(service_type)))
}

pub async fn update_service_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateServiceType>,
) -> Result<ResponseJson<ApiResponse<ServiceType>>, ApiError> {
    let service_type = ServiceType::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(service_type)))
}

pub async fn delete_service_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = ServiceType::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("tipo de serviço"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/service-types",
        Router::new()
            .route("/", get(list_service_types).post(create_service_type))
            .route(
                "/{id}",
                get(get_service_type)
                    .put(update_service_type)
                    .delete(delete_service_type),
            ),
    )
}
