use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::client::{Client, ClientDetail, CreateClient, UpdateClient};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Client>>>, ApiError> {
    let clients = Client::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(clients)))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClient>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Client>>), ApiError> {
    let client = Client::create(&state.db.pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(client))))
}

/// Detail view includes every dependent record.
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<ClientDetail>>, ApiError> {
    let detail = Client::find_detail(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("cliente"))?;
    Ok(ResponseJson(ApiResponse::success(detail)))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateClient>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    let client = Client::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Client::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("cliente"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/clients",
        Router::new()
            .route("/", get(list_clients).post(create_client))
            .route(
                "/{id}",
                get(get_client).put(update_client).delete(delete_client),
            ),
    )
}
