//! Turns the optional query criteria of each report into explicit,
//! validated filter structs and the data-access constraints they imply.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use db::models::{
    support::SupportReportQuery,
    task::{TaskReportQuery, TaskStatus},
};
use serde::Deserialize;
use thiserror::Error;
use ts_rs::TS;

use super::ReportDefaults;

pub const MAX_FETCH_LIMIT: i64 = 1000;

const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_milli_opt(23, 59, 59, 999) {
    Some(t) => t,
    None => panic!("static end-of-day time"),
};

/// Malformed report inputs. Never coerced silently; surfaced as 4xx.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("data inválida '{0}', esperado AAAA-MM-DD")]
    InvalidDate(String),
    #[error("cliente inválido '{0}'")]
    InvalidClientId(String),
    #[error("limite inválido '{0}', esperado 1..={MAX_FETCH_LIMIT}")]
    InvalidLimit(String),
    #[error("valor booleano inválido '{0}'")]
    InvalidBool(String),
}

/// Inclusive calendar-date range; either side may be open-ended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, FilterError> {
        Ok(Self {
            from: parse_date(from)?,
            to: parse_date(to)?,
        })
    }

    /// Start of the first day, as a timestamp bound.
    pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.from
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// The final day is inclusive through end-of-day.
    pub fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.to.map(|d| d.and_time(END_OF_DAY).and_utc())
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.lower_bound().is_none_or(|lo| at >= lo)
            && self.upper_bound().is_none_or(|hi| at <= hi)
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    match present(raw) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FilterError::InvalidDate(s.to_string())),
    }
}

fn parse_client_id(raw: Option<&str>) -> Result<Option<i64>, FilterError> {
    match present(raw) {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| FilterError::InvalidClientId(s.to_string())),
    }
}

fn parse_limit(raw: Option<&str>, default: i64) -> Result<i64, FilterError> {
    match present(raw) {
        None => Ok(default),
        Some(s) => match s.parse::<i64>() {
            Ok(n) if (1..=MAX_FETCH_LIMIT).contains(&n) => Ok(n),
            _ => Err(FilterError::InvalidLimit(s.to_string())),
        },
    }
}

fn parse_flag(raw: Option<&str>) -> Result<bool, FilterError> {
    match present(raw) {
        None => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(FilterError::InvalidBool(other.to_string())),
    }
}

/// Resolution of the `status` query parameter.
///
/// Unknown values are accepted and simply match zero records — a
/// deliberate permissive policy, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusFilter {
    All,
    Matches(TaskStatus),
    Unknown(String),
}

impl StatusFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match present(raw) {
            None => StatusFilter::All,
            Some(s) if s.eq_ignore_ascii_case("todos") || s.eq_ignore_ascii_case("all") => {
                StatusFilter::All
            }
            Some(s) => match TaskStatus::from_raw(s) {
                Some(status) => StatusFilter::Matches(status),
                None => {
                    tracing::warn!(status = s, "status filter outside the taxonomy");
                    StatusFilter::Unknown(s.to_string())
                }
            },
        }
    }

    fn as_query_value(&self) -> Option<String> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Matches(status) => Some(status.to_string()),
            StatusFilter::Unknown(raw) => Some(raw.clone()),
        }
    }
}

/// Output selector shared by every report endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    Excel,
}

/// Raw query parameters of the tasks-by-status report.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default)]
pub struct TaskReportParams {
    pub status: Option<String>,
    #[serde(rename = "clienteId", alias = "cliente_id")]
    pub cliente_id: Option<String>,
    #[serde(rename = "dataInicial", alias = "dataInicio")]
    pub data_inicial: Option<String>,
    #[serde(rename = "dataFinal", alias = "dataFim")]
    pub data_final: Option<String>,
    pub limit: Option<String>,
    pub format: ReportFormat,
}

#[derive(Debug, Clone)]
pub struct TaskReportFilter {
    pub status: StatusFilter,
    pub client_id: Option<i64>,
    pub range: DateRange,
    pub limit: i64,
}

impl TaskReportFilter {
    pub fn resolve(
        params: &TaskReportParams,
        defaults: &ReportDefaults,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            status: StatusFilter::parse(params.status.as_deref()),
            client_id: parse_client_id(params.cliente_id.as_deref())?,
            range: DateRange::parse(
                params.data_inicial.as_deref(),
                params.data_final.as_deref(),
            )?,
            limit: parse_limit(params.limit.as_deref(), defaults.fetch_limit)?,
        })
    }

    pub fn to_query(&self) -> TaskReportQuery {
        TaskReportQuery {
            status: self.status.as_query_value(),
            client_id: self.client_id,
            start_from: self.range.lower_bound(),
            start_until: self.range.upper_bound(),
            limit: self.limit,
        }
    }
}

/// Raw query parameters of the support report.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default)]
pub struct SupportReportParams {
    #[serde(rename = "clienteId", alias = "cliente_id")]
    pub cliente_id: Option<String>,
    #[serde(rename = "dataInicial", alias = "dataInicio")]
    pub data_inicial: Option<String>,
    #[serde(rename = "dataFinal", alias = "dataFim")]
    pub data_final: Option<String>,
    pub limit: Option<String>,
    pub format: ReportFormat,
}

#[derive(Debug, Clone)]
pub struct SupportReportFilter {
    pub client_id: Option<i64>,
    pub range: DateRange,
    pub limit: i64,
}

impl SupportReportFilter {
    pub fn resolve(
        params: &SupportReportParams,
        defaults: &ReportDefaults,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            client_id: parse_client_id(params.cliente_id.as_deref())?,
            range: DateRange::parse(
                params.data_inicial.as_deref(),
                params.data_final.as_deref(),
            )?,
            limit: parse_limit(params.limit.as_deref(), defaults.fetch_limit)?,
        })
    }

    pub fn to_query(&self) -> SupportReportQuery {
        SupportReportQuery {
            client_id: self.client_id,
            date_from: self.range.lower_bound(),
            date_until: self.range.upper_bound(),
            limit: self.limit,
        }
    }
}

/// Raw query parameters of the combined financial report.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default)]
pub struct FinancialReportParams {
    #[serde(rename = "dataInicio", alias = "dataInicial")]
    pub data_inicio: Option<String>,
    #[serde(rename = "dataFim", alias = "dataFinal")]
    pub data_fim: Option<String>,
    #[serde(rename = "incluirSuportes")]
    pub incluir_suportes: Option<String>,
    pub limit: Option<String>,
    pub format: ReportFormat,
}

#[derive(Debug, Clone)]
pub struct FinancialReportFilter {
    /// Always fully bounded: missing ends fall back to the configured
    /// lookback window ending today.
    pub range: DateRange,
    pub include_support: bool,
    pub limit: i64,
}

impl FinancialReportFilter {
    pub fn resolve(
        params: &FinancialReportParams,
        defaults: &ReportDefaults,
        today: NaiveDate,
    ) -> Result<Self, FilterError> {
        let parsed = DateRange::parse(params.data_inicio.as_deref(), params.data_fim.as_deref())?;
        let range = DateRange {
            from: parsed.from.or_else(|| defaults.financial_period_start(today)),
            to: parsed.to.or(Some(today)),
        };
        Ok(Self {
            range,
            include_support: parse_flag(params.incluir_suportes.as_deref())?,
            limit: parse_limit(params.limit.as_deref(), defaults.fetch_limit)?,
        })
    }

    pub fn task_query(&self) -> TaskReportQuery {
        TaskReportQuery {
            status: None,
            client_id: None,
            start_from: self.range.lower_bound(),
            start_until: self.range.upper_bound(),
            limit: self.limit,
        }
    }

    pub fn support_query(&self) -> SupportReportQuery {
        SupportReportQuery {
            client_id: None,
            date_from: self.range.lower_bound(),
            date_until: self.range.upper_bound(),
            limit: self.limit,
        }
    }
}

/// Raw query parameters of the clients report.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(default)]
pub struct ClientReportParams {
    #[serde(rename = "clienteId", alias = "cliente_id")]
    pub cliente_id: Option<String>,
    pub format: ReportFormat,
}

#[derive(Debug, Clone)]
pub struct ClientReportFilter {
    pub client_id: Option<i64>,
}

impl ClientReportFilter {
    pub fn resolve(params: &ClientReportParams) -> Result<Self, FilterError> {
        Ok(Self {
            client_id: parse_client_id(params.cliente_id.as_deref())?,
        })
    }
}
