use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

use super::{license::License, support::SupportTicket, task::Task};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub legal_name: Option<String>,
    /// CNPJ, stored as digits or formatted; display formatting happens at
    /// presentation time.
    pub tax_id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateClient {
    pub name: String,
    pub legal_name: Option<String>,
    pub tax_id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Absent fields keep their current value.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// A client with every dependent record, the detail-endpoint shape.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ClientDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub client: Client,
    pub tasks: Vec<Task>,
    pub support_tickets: Vec<SupportTicket>,
    pub licenses: Vec<License>,
}

impl Client {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM clients ORDER BY name ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_detail(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<ClientDetail>, sqlx::Error> {
        let Some(client) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let tasks = Task::find_by_client_id(pool, id).await?;
        let support_tickets = SupportTicket::find_by_client_id(pool, id).await?;
        let licenses = License::find_by_client_id(pool, id).await?;
        Ok(Some(ClientDetail {
            client,
            tasks,
            support_tickets,
            licenses,
        }))
    }

    pub async fn create(pool: &SqlitePool, data: &CreateClient) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO clients (name, legal_name, tax_id, phone, email, address)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(&data.name)
        .bind(data.legal_name.as_deref())
        .bind(&data.tax_id)
        .bind(data.phone.as_deref())
        .bind(data.email.as_deref())
        .bind(data.address.as_deref())
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateClient,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE clients
               SET name = COALESCE($2, name),
                   legal_name = COALESCE($3, legal_name),
                   tax_id = COALESCE($4, tax_id),
                   phone = COALESCE($5, phone),
                   email = COALESCE($6, email),
                   address = COALESCE($7, address)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.legal_name.as_deref())
        .bind(data.tax_id.as_deref())
        .bind(data.phone.as_deref())
        .bind(data.email.as_deref())
        .bind(data.address.as_deref())
        .fetch_one(pool)
        .await
    }

    /// Hard delete; dependent tasks, tickets and licenses cascade.
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
