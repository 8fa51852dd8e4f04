use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

/// A license/certificate held by a client. Independent lifecycle, no
/// relation to tasks or support.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct License {
    pub id: i64,
    pub client_id: i64,
    pub name: String,
    pub expires_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct LicenseWithClient {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub license: License,
    pub client_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateLicense {
    pub client_id: i64,
    pub name: String,
    pub expires_on: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateLicense {
    pub name: Option<String>,
    pub expires_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl License {
    /// Soonest expiry first, the order the dashboard shows renewals in.
    pub async fn find_all(
        pool: &SqlitePool,
        client_id: Option<i64>,
    ) -> Result<Vec<LicenseWithClient>, sqlx::Error> {
        sqlx::query_as::<_, LicenseWithClient>(
            r#"SELECT l.*, c.name AS client_name
               FROM licenses l
               JOIN clients c ON c.id = l.client_id
               WHERE ($1 IS NULL OR l.client_id = $1)
               ORDER BY l.expires_on ASC"#,
        )
        .bind(client_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<LicenseWithClient>, sqlx::Error> {
        sqlx::query_as::<_, LicenseWithClient>(
            r#"SELECT l.*, c.name AS client_name
               FROM licenses l
               JOIN clients c ON c.id = l.client_id
               WHERE l.id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_client_id(
        pool: &SqlitePool,
        client_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM licenses WHERE client_id = $1 ORDER BY expires_on ASC",
        )
        .bind(client_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateLicense) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO licenses (client_id, name, expires_on, notes)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(data.client_id)
        .bind(&data.name)
        .bind(data.expires_on)
        .bind(data.notes.as_deref())
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateLicense,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE licenses
               SET name = COALESCE($2, name),
                   expires_on = COALESCE($3, expires_on),
                   notes = COALESCE($4, notes)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.expires_on)
        .bind(data.notes.as_deref())
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM licenses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
