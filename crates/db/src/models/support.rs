use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

/// A billable support interaction, billed by hourly rate × duration.
///
/// `duration_hours` and `total_value` are always server-computed from the
/// time window and rate; client-supplied values are ignored. Both stay
/// NULL while the ticket is open (`end_time` unset).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SupportTicket {
    pub id: i64,
    pub client_id: i64,
    pub description: String,
    pub hourly_rate: f64,
    pub support_date: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_hours: Option<f64>,
    pub total_value: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SupportTicketWithClient {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub ticket: SupportTicket,
    pub client_name: String,
    pub client_tax_id: String,
}

impl std::ops::Deref for SupportTicketWithClient {
    type Target = SupportTicket;
    fn deref(&self) -> &Self::Target {
        &self.ticket
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateSupportTicket {
    pub client_id: i64,
    pub description: String,
    pub hourly_rate: f64,
    pub support_date: Option<DateTime<Utc>>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Absent fields keep their current value; billing is recomputed from the
/// merged result.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateSupportTicket {
    pub description: Option<String>,
    pub hourly_rate: Option<f64>,
    pub support_date: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Report-level data access constraints for support tickets.
#[derive(Debug, Clone, Default)]
pub struct SupportReportQuery {
    pub client_id: Option<i64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_until: Option<DateTime<Utc>>,
    pub limit: i64,
}

/// Duration in hours (clamped to ≥ 0) and total, while the window is
/// closed; `(None, None)` otherwise.
pub fn billing(
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    hourly_rate: f64,
) -> (Option<f64>, Option<f64>) {
    match end_time {
        Some(end) => {
            let millis = (end - start_time).num_milliseconds().max(0);
            let hours = millis as f64 / 3_600_000.0;
            (Some(hours), Some(hourly_rate * hours))
        }
        None => (None, None),
    }
}

const SUPPORT_CLIENT_SELECT: &str = r#"SELECT s.*,
       c.name AS client_name,
       c.tax_id AS client_tax_id
  FROM support_tickets s
  JOIN clients c ON c.id = s.client_id"#;

impl SupportTicket {
    pub async fn find_all(
        pool: &SqlitePool,
        client_id: Option<i64>,
    ) -> Result<Vec<SupportTicketWithClient>, sqlx::Error> {
        let sql = format!(
            "{SUPPORT_CLIENT_SELECT}
 WHERE ($1 IS NULL OR s.client_id = $1)
 ORDER BY datetime(s.support_date) DESC, s.id DESC"
        );
        sqlx::query_as::<_, SupportTicketWithClient>(&sql)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<SupportTicketWithClient>, sqlx::Error> {
        let sql = format!("{SUPPORT_CLIENT_SELECT}\n WHERE s.id = $1");
        sqlx::query_as::<_, SupportTicketWithClient>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_client_id(
        pool: &SqlitePool,
        client_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM support_tickets WHERE client_id = $1 ORDER BY datetime(support_date) DESC, id DESC",
        )
        .bind(client_id)
        .fetch_all(pool)
        .await
    }

    /// Fetch for the support report: date-sorted, id-descending tie-break.
    pub async fn find_for_report(
        pool: &SqlitePool,
        query: &SupportReportQuery,
    ) -> Result<Vec<SupportTicketWithClient>, sqlx::Error> {
        let sql = format!(
            "{SUPPORT_CLIENT_SELECT}
 WHERE ($1 IS NULL OR s.client_id = $1)
   AND ($2 IS NULL OR datetime(s.support_date) >= datetime($2))
   AND ($3 IS NULL OR datetime(s.support_date) <= datetime($3))
 ORDER BY datetime(s.support_date) DESC, s.id DESC
 LIMIT $4"
        );
        sqlx::query_as::<_, SupportTicketWithClient>(&sql)
            .bind(query.client_id)
            .bind(query.date_from)
            .bind(query.date_until)
            .bind(query.limit)
            .fetch_all(pool)
            .await
    }

    /// Fetch for the combined financial report: id-descending.
    pub async fn find_for_financial(
        pool: &SqlitePool,
        query: &SupportReportQuery,
    ) -> Result<Vec<SupportTicketWithClient>, sqlx::Error> {
        let sql = format!(
            "{SUPPORT_CLIENT_SELECT}
 WHERE ($1 IS NULL OR s.client_id = $1)
   AND ($2 IS NULL OR datetime(s.support_date) >= datetime($2))
   AND ($3 IS NULL OR datetime(s.support_date) <= datetime($3))
 ORDER BY s.id DESC
 LIMIT $4"
        );
        sqlx::query_as::<_, SupportTicketWithClient>(&sql)
            .bind(query.client_id)
            .bind(query.date_from)
            .bind(query.date_until)
            .bind(query.limit)
            .fetch_all(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateSupportTicket,
    ) -> Result<Self, sqlx::Error> {
        let support_date = data.support_date.unwrap_or_else(Utc::now);
        let (duration_hours, total_value) =
            billing(data.start_time, data.end_time, data.hourly_rate);
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO support_tickets
               (client_id, description, hourly_rate, support_date, start_time, end_time, duration_hours, total_value)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(data.client_id)
        .bind(&data.description)
        .bind(data.hourly_rate)
        .bind(support_date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(duration_hours)
        .bind(total_value)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateSupportTicket,
    ) -> Result<Self, sqlx::Error> {
        let current: Self = sqlx::query_as("SELECT * FROM support_tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let hourly_rate = data.hourly_rate.unwrap_or(current.hourly_rate);
        let start_time = data.start_time.unwrap_or(current.start_time);
        let end_time = data.end_time.or(current.end_time);
        let (duration_hours, total_value) = billing(start_time, end_time, hourly_rate);

        sqlx::query_as::<_, Self>(
            r#"UPDATE support_tickets
               SET description = COALESCE($2, description),
                   hourly_rate = $3,
                   support_date = COALESCE($4, support_date),
                   start_time = $5,
                   end_time = $6,
                   duration_hours = $7,
                   total_value = $8
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.description.as_deref())
        .bind(hourly_rate)
        .bind(data.support_date)
        .bind(start_time)
        .bind(end_time)
        .bind(duration_hours)
        .bind(total_value)
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM support_tickets WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn billing_is_rate_times_hours() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 10, 11, 30, 0).unwrap();
        let (hours, total) = billing(start, Some(end), 120.0);
        assert_eq!(hours, Some(2.5));
        assert_eq!(total, Some(300.0));
    }

    #[test]
    fn billing_clamps_negative_windows_to_zero() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 11, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let (hours, total) = billing(start, Some(end), 120.0);
        assert_eq!(hours, Some(0.0));
        assert_eq!(total, Some(0.0));
    }

    #[test]
    fn open_window_has_no_billing() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        assert_eq!(billing(start, None, 120.0), (None, None));
    }
}
