use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::support::{
    CreateSupportTicket, SupportTicket, SupportTicketWithClient, UpdateSupportTicket,
};
use serde::Deserialize;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SupportListParams {
    #[serde(rename = "clienteId", alias = "cliente_id")]
    pub cliente_id: Option<i64>,
}

pub async fn list_support(
    State(state): State<AppState>,
    Query(params): Query<SupportListParams>,
) -> Result<ResponseJson<ApiResponse<Vec<SupportTicketWithClient>>>, ApiError> {
    let tickets = SupportTicket::find_all(&state.db.pool, params.cliente_id).await?;
    Ok(ResponseJson(ApiResponse::success(tickets)))
}

pub async fn create_support(
    State(state): State<AppState>,
    Json(payload): Json<CreateSupportTicket>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<SupportTicket>>), ApiError> {
    let ticket = SupportTicket::create(&state.db.pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(ticket))))
}

pub async fn get_support(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<SupportTicketWithClient>>, ApiError> {
    let ticket = SupportTicket::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("suporte"))?;
    Ok(ResponseJson(ApiResponse::success(ticket)))
}

pub async fn update_support(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSupportTicket>,
) -> Result<ResponseJson<ApiResponse<SupportTicket>>, ApiError> {
    let ticket = SupportTicket::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(ticket)))
}

pub async fn delete_support(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = SupportTicket::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("suporte"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/support",
        Router::new()
            .route("/", get(list_support).post(create_support))
            .route(
                "/{id}",
                get(get_support).put(update_support).delete(delete_support),
            ),
    )
}
