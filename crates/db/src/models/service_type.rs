use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

/// A kind of service the company performs, optionally tied to the
/// government body responsible for it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ServiceType {
    pub id: i64,
    pub name: String,
    pub authority: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateServiceType {
    pub name: String,
    pub authority: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateServiceType {
    pub name: Option<String>,
    pub authority: Option<String>,
}

impl ServiceType {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM service_types ORDER BY name ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM service_types WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateServiceType) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO service_types (name, authority) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.authority.as_deref())
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateServiceType,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE service_types
               SET name = COALESCE($2, name),
                   authority = COALESCE($3, authority)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.authority.as_deref())
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM service_types WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
