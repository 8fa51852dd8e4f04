use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// Lifecycle stages of a service engagement, in canonical display order.
///
/// The serialized strings are the wire and storage representation; legacy
/// rows may carry spacing/case variants, which [`TaskStatus::from_raw`]
/// resolves.
#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    #[default]
    Iniciado,
    #[sqlx(rename = "Coleta_de_Informações")]
    #[serde(rename = "Coleta_de_Informações")]
    #[strum(serialize = "Coleta_de_Informações")]
    ColetaDeInformacoes,
    Execucao,
    #[sqlx(rename = "Aprovação_Cliente")]
    #[serde(rename = "Aprovação_Cliente")]
    #[strum(serialize = "Aprovação_Cliente")]
    AprovacaoCliente,
    Protocolado,
    #[sqlx(rename = "Concluído")]
    #[serde(rename = "Concluído")]
    #[strum(serialize = "Concluído")]
    Concluido,
    Encerrado,
}

impl TaskStatus {
    /// Canonical display order. Consumers grouping "all statuses" must use
    /// exactly this set and order.
    pub const CANONICAL: [TaskStatus; 7] = [
        TaskStatus::Iniciado,
        TaskStatus::ColetaDeInformacoes,
        TaskStatus::Execucao,
        TaskStatus::AprovacaoCliente,
        TaskStatus::Protocolado,
        TaskStatus::Concluido,
        TaskStatus::Encerrado,
    ];

    /// Resolves a stored/user-supplied status string against the taxonomy.
    ///
    /// Spaces and underscores are interchangeable and the comparison is
    /// case-insensitive, so `"Coleta de Informações"` and
    /// `"Coleta_De_Informações"` both resolve to
    /// [`TaskStatus::ColetaDeInformacoes`]. Returns `None` for anything
    /// outside the taxonomy.
    pub fn from_raw(raw: &str) -> Option<TaskStatus> {
        let normalized = raw.trim().replace(' ', "_").to_lowercase();
        TaskStatus::CANONICAL
            .iter()
            .find(|status| status.to_string().to_lowercase() == normalized)
            .cloned()
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: i64,
    pub client_id: i64,
    pub service_type_id: i64,
    /// Stored status string. Writes always store a canonical taxonomy
    /// value; reads tolerate legacy spellings.
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub total_value: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn taxonomy_status(&self) -> Option<TaskStatus> {
        TaskStatus::from_raw(&self.status)
    }
}

/// Task joined with its client and service type, the shape list endpoints
/// and reports consume.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TaskWithContext {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub task: Task,
    pub client_name: String,
    pub client_tax_id: String,
    pub service_name: String,
    pub service_authority: Option<String>,
}

impl std::ops::Deref for TaskWithContext {
    type Target = Task;
    fn deref(&self) -> &Self::Target {
        &self.task
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTask {
    pub client_id: i64,
    pub service_type_id: i64,
    pub status: Option<TaskStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<NaiveDate>,
    pub total_value: Option<f64>,
    pub notes: Option<String>,
}

/// Absent fields keep their current value.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateTask {
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
    pub total_value: Option<f64>,
    pub notes: Option<String>,
}

/// Report-level data access constraints, produced by the filter resolver.
#[derive(Debug, Clone, Default)]
pub struct TaskReportQuery {
    /// Exact status string to match; unknown values simply match nothing.
    pub status: Option<String>,
    pub client_id: Option<i64>,
    pub start_from: Option<DateTime<Utc>>,
    pub start_until: Option<DateTime<Utc>>,
    pub limit: i64,
}

const TASK_CONTEXT_SELECT: &str = r#"SELECT t.*,
       c.name AS client_name,
       c.tax_id AS client_tax_id,
       st.name AS service_name,
       st.authority AS service_authority
  FROM tasks t
  JOIN clients c ON c.id = t.client_id
  JOIN service_types st ON st.id = t.service_type_id"#;

impl Task {
    pub async fn find_all(
        pool: &SqlitePool,
        status: Option<&str>,
        limit: i64,
    ) -> Result<Vec<TaskWithContext>, sqlx::Error> {
        let sql = format!(
            "{TASK_CONTEXT_SELECT}
 WHERE ($1 IS NULL OR t.status = $1)
 ORDER BY t.id DESC
 LIMIT $2"
        );
        sqlx::query_as::<_, TaskWithContext>(&sql)
            .bind(status)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<TaskWithContext>, sqlx::Error> {
        let sql = format!("{TASK_CONTEXT_SELECT}\n WHERE t.id = $1");
        sqlx::query_as::<_, TaskWithContext>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_client_id(
        pool: &SqlitePool,
        client_id: i64,
    ) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE client_id = $1 ORDER BY id DESC",
        )
        .bind(client_id)
        .fetch_all(pool)
        .await
    }

    /// Fetch for report generation. Date bounds compare on `start_date`,
    /// normalized through `datetime()` so legacy textual formats still
    /// order correctly.
    pub async fn find_for_report(
        pool: &SqlitePool,
        query: &TaskReportQuery,
    ) -> Result<Vec<TaskWithContext>, sqlx::Error> {
        let sql = format!(
            "{TASK_CONTEXT_SELECT}
 WHERE ($1 IS NULL OR t.status = $1)
   AND ($2 IS NULL OR t.client_id = $2)
   AND ($3 IS NULL OR datetime(t.start_date) >= datetime($3))
   AND ($4 IS NULL OR datetime(t.start_date) <= datetime($4))
 ORDER BY t.id DESC
 LIMIT $5"
        );
        sqlx::query_as::<_, TaskWithContext>(&sql)
            .bind(query.status.as_deref())
            .bind(query.client_id)
            .bind(query.start_from)
            .bind(query.start_until)
            .bind(query.limit)
            .fetch_all(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateTask) -> Result<Task, sqlx::Error> {
        let status = data.status.clone().unwrap_or_default();
        let start_date = data.start_date.unwrap_or_else(Utc::now);
        sqlx::query_as::<_, Task>(
            r#"INSERT INTO tasks (client_id, service_type_id, status, start_date, due_date, total_value, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(data.client_id)
        .bind(data.service_type_id)
        .bind(status)
        .bind(start_date)
        .bind(data.due_date)
        .bind(data.total_value)
        .bind(data.notes.as_deref())
        .fetch_one(pool)
        .await
    }

    /// Applies the partial update; a status change also appends a row to
    /// the task's status history, atomically.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateTask,
    ) -> Result<Task, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let updated: Task = sqlx::query_as(
            r#"UPDATE tasks
               SET status = COALESCE($2, status),
                   due_date = COALESCE($3, due_date),
                   total_value = COALESCE($4, total_value),
                   notes = COALESCE($5, notes),
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.status.clone())
        .bind(data.due_date)
        .bind(data.total_value)
        .bind(data.notes.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        if updated.status != current.status {
            sqlx::query(
                "INSERT INTO task_status_history (task_id, status, changed_at) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(&updated.status)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

/// One entry of a task's status history, newest first on fetch.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TaskStatusChange {
    pub id: i64,
    pub task_id: i64,
    pub status: String,
    pub changed_at: DateTime<Utc>,
}

impl TaskStatusChange {
    pub async fn find_by_task_id(
        pool: &SqlitePool,
        task_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM task_status_history WHERE task_id = $1 ORDER BY changed_at DESC, id DESC",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }
}

/// A sub-step of a task, ordered by insertion.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TaskStage {
    pub id: i64,
    pub task_id: i64,
    pub name: String,
    pub stage_date: Option<NaiveDate>,
    pub done: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTaskStage {
    pub name: String,
    pub stage_date: Option<NaiveDate>,
    pub done: Option<bool>,
    pub notes: Option<String>,
}

impl TaskStage {
    pub async fn find_by_task_id(
        pool: &SqlitePool,
        task_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM task_stages WHERE task_id = $1 ORDER BY id ASC")
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        task_id: i64,
        data: &CreateTaskStage,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO task_stages (task_id, name, stage_date, done, notes)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(task_id)
        .bind(&data.name)
        .bind(data.stage_date)
        .bind(data.done.unwrap_or(false))
        .bind(data.notes.as_deref())
        .fetch_one(pool)
        .await
    }
}
