//! Report downloads. Each endpoint returns either an inline PDF or an
//! xlsx attachment, selected by `format`; bytes are fully materialized
//! before the response, so a failure never yields a truncated file.

use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use services::services::reports::{
    RenderedReport,
    filter::{ClientReportParams, FinancialReportParams, SupportReportParams, TaskReportParams},
};

use crate::{AppState, error::ApiError};

fn report_response(report: RenderedReport) -> Response {
    (
        [
            (header::CONTENT_TYPE, report.content_type.to_string()),
            (header::CONTENT_DISPOSITION, report.disposition),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        report.bytes,
    )
        .into_response()
}

pub async fn tasks_report(
    State(state): State<AppState>,
    Query(params): Query<TaskReportParams>,
) -> Result<Response, ApiError> {
    let report = state.reports.tasks_report(&state.db.pool, &params).await?;
    Ok(report_response(report))
}

pub async fn clients_report(
    State(state): State<AppState>,
    Query(params): Query<ClientReportParams>,
) -> Result<Response, ApiError> {
    let report = state
        .reports
        .clients_report(&state.db.pool, &params)
        .await?;
    Ok(report_response(report))
}

pub async fn support_report(
    State(state): State<AppState>,
    Query(params): Query<SupportReportParams>,
) -> Result<Response, ApiError> {
    let report = state
        .reports
        .support_report(&state.db.pool, &params)
        .await?;
    Ok(report_response(report))
}

pub async fn financial_report(
    State(state): State<AppState>,
    Query(params): Query<FinancialReportParams>,
) -> Result<Response, ApiError> {
    let report = state
        .reports
        .financial_report(&state.db.pool, &params)
        .await?;
    Ok(report_response(report))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/reports",
        Router::new()
            .route("/tasks", get(tasks_report))
            .route("/clients", get(clients_report))
            .route("/support", get(support_report))
            .route("/financial", get(financial_report)),
    )
}
