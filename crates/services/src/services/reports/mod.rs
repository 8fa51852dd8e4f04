//! Report generation: filter resolution, aggregation and presentation.
//!
//! Each report runs request-scoped and all-or-nothing: the response bytes
//! are fully materialized before anything is returned, and a fetch or
//! render failure surfaces instead of degrading into an empty document.

pub mod aggregate;
pub mod excel;
pub mod filter;
pub mod format;
pub mod html;
pub mod ledger;

use std::{collections::HashMap, sync::Arc};

use chrono::{NaiveDate, Utc};
use db::models::{
    client::Client,
    support::SupportTicket,
    task::{Task, TaskWithContext},
};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use super::renderer::{PdfRenderer, RendererError};
use aggregate::{Taxonomy, group_by_status, money};
use filter::{
    ClientReportFilter, ClientReportParams, FilterError, FinancialReportFilter,
    FinancialReportParams, ReportFormat, SupportReportFilter, SupportReportParams,
    TaskReportFilter, TaskReportParams,
};
use ledger::Ledger;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("cliente {0} não encontrado")]
    ClientNotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("pdf renderer error: {0}")]
    Renderer(#[from] RendererError),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

/// Fixed report knobs, injected rather than ambient.
#[derive(Debug, Clone)]
pub struct ReportDefaults {
    /// Row cap applied when the request does not pass `limit`.
    pub fetch_limit: i64,
    /// How far back the financial report reaches when `dataInicio` is
    /// omitted.
    pub financial_lookback_months: u32,
}

impl Default for ReportDefaults {
    fn default() -> Self {
        Self {
            fetch_limit: 200,
            financial_lookback_months: 1,
        }
    }
}

impl ReportDefaults {
    pub fn financial_period_start(&self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_sub_months(chrono::Months::new(self.financial_lookback_months))
    }
}

/// A fully-generated report body plus the HTTP metadata to serve it.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub disposition: String,
}

impl RenderedReport {
    fn pdf(bytes: Vec<u8>, filename: &str) -> Self {
        Self {
            bytes,
            content_type: "application/pdf",
            disposition: format!("inline; filename=\"{filename}\""),
        }
    }

    fn excel(bytes: Vec<u8>, filename: &str) -> Self {
        Self {
            bytes,
            content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            disposition: format!("attachment; filename=\"{filename}\""),
        }
    }
}

/// One client plus the tasks shown under it in the clients report.
#[derive(Debug)]
pub struct ClientSection<'a> {
    pub client: &'a Client,
    pub tasks: Vec<&'a TaskWithContext>,
}

pub struct ReportService {
    taxonomy: Taxonomy,
    defaults: ReportDefaults,
    renderer: Arc<dyn PdfRenderer>,
}

impl ReportService {
    pub fn new(renderer: Arc<dyn PdfRenderer>) -> Self {
        Self::with_config(renderer, Taxonomy::default(), ReportDefaults::default())
    }

    pub fn with_config(
        renderer: Arc<dyn PdfRenderer>,
        taxonomy: Taxonomy,
        defaults: ReportDefaults,
    ) -> Self {
        Self {
            taxonomy,
            defaults,
            renderer,
        }
    }

    /// Tasks grouped by lifecycle status.
    pub async fn tasks_report(
        &self,
        pool: &SqlitePool,
        params: &TaskReportParams,
    ) -> Result<RenderedReport, ReportError> {
        let filter = TaskReportFilter::resolve(params, &self.defaults)?;
        let records = Task::find_for_report(pool, &filter.to_query()).await?;
        let breakdown = group_by_status(&records, &self.taxonomy);
        info!(
            records = breakdown.record_count,
            unmatched = breakdown.unmatched,
            "tasks report aggregated"
        );

        match params.format {
            ReportFormat::Pdf => {
                let markup = html::tasks(&breakdown);
                let bytes = self.renderer.render(&markup).await?;
                Ok(RenderedReport::pdf(bytes, "relatorio-tarefas.pdf"))
            }
            ReportFormat::Excel => {
                let bytes = excel::to_bytes(&excel::tasks_sheets(&breakdown))?;
                Ok(RenderedReport::excel(bytes, "relatorio-tarefas.xlsx"))
            }
        }
    }

    /// Clients with their tasks, one section per client.
    pub async fn clients_report(
        &self,
        pool: &SqlitePool,
        params: &ClientReportParams,
    ) -> Result<RenderedReport, ReportError> {
        let filter = ClientReportFilter::resolve(params)?;

        let clients = match filter.client_id {
            Some(id) => vec![
                Client::find_by_id(pool, id)
                    .await?
                    .ok_or(ReportError::ClientNotFound(id))?,
            ],
            None => Client::find_all(pool).await?,
        };
        let tasks = Task::find_for_report(
            pool,
            &db::models::task::TaskReportQuery {
                client_id: filter.client_id,
                limit: self.defaults.fetch_limit,
                ..Default::default()
            },
        )
        .await?;

        let mut by_client: HashMap<i64, Vec<&TaskWithContext>> = HashMap::new();
        for task in &tasks {
            by_client.entry(task.client_id).or_default().push(task);
        }
        let sections: Vec<ClientSection<'_>> = clients
            .iter()
            .map(|client| ClientSection {
                client,
                tasks: by_client.remove(&client.id).unwrap_or_default(),
            })
            .collect();
        info!(clients = sections.len(), tasks = tasks.len(), "clients report aggregated");

        match params.format {
            ReportFormat::Pdf => {
                let markup = html::clients(&sections);
                let bytes = self.renderer.render(&markup).await?;
                Ok(RenderedReport::pdf(bytes, "relatorio-clientes.pdf"))
            }
            ReportFormat::Excel => {
                let bytes = excel::to_bytes(&excel::clients_sheet(&sections))?;
                Ok(RenderedReport::excel(bytes, "relatorio-clientes.xlsx"))
            }
        }
    }

    /// Support listing with the period total.
    pub async fn support_report(
        &self,
        pool: &SqlitePool,
        params: &SupportReportParams,
    ) -> Result<RenderedReport, ReportError> {
        let filter = SupportReportFilter::resolve(params, &self.defaults)?;
        let tickets = SupportTicket::find_for_report(pool, &filter.to_query()).await?;
        let total: Decimal = tickets.iter().map(|t| money(t.total_value)).sum();
        info!(tickets = tickets.len(), "support report aggregated");

        match params.format {
            ReportFormat::Pdf => {
                let markup = html::support(&tickets, total);
                let bytes = self.renderer.render(&markup).await?;
                Ok(RenderedReport::pdf(bytes, "relatorio-suportes.pdf"))
            }
            ReportFormat::Excel => {
                let bytes = excel::to_bytes(&excel::support_sheet(&tickets, total))?;
                Ok(RenderedReport::excel(bytes, "relatorio-suportes.xlsx"))
            }
        }
    }

    /// Combined financial ledger; `incluirSuportes` gates support rows in
    /// every output format alike.
    pub async fn financial_report(
        &self,
        pool: &SqlitePool,
        params: &FinancialReportParams,
    ) -> Result<RenderedReport, ReportError> {
        let today = Utc::now().date_naive();
        let filter = FinancialReportFilter::resolve(params, &self.defaults, today)?;

        let tasks = Task::find_for_report(pool, &filter.task_query()).await?;
        let tickets = if filter.include_support {
            SupportTicket::find_for_financial(pool, &filter.support_query()).await?
        } else {
            Vec::new()
        };
        let ledger = Ledger::build(&tasks, &tickets, filter.include_support);
        info!(
            rows = ledger.rows.len(),
            include_support = filter.include_support,
            "financial report aggregated"
        );

        match params.format {
            ReportFormat::Pdf => {
                let markup = html::financial(&ledger, &filter.range);
                let bytes = self.renderer.render(&markup).await?;
                Ok(RenderedReport::pdf(bytes, "relatorio-financeiro.pdf"))
            }
            ReportFormat::Excel => {
                let bytes = excel::to_bytes(&excel::financial_sheet(&ledger))?;
                Ok(RenderedReport::excel(bytes, "relatorio-financeiro.xlsx"))
            }
        }
    }
}
