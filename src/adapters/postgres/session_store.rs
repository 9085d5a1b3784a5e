//! PostgreSQL implementation of SessionStore.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::domain::category::Category;
use crate::domain::foundation::{PartyRole, SessionRecordId, Timestamp};
use crate::domain::preparation::{normalize_name, PartySubmission};
use crate::domain::session::SessionRecord;
use crate::ports::{SessionStore, StoreError};

const SELECT_COLUMNS: &str = r#"
    SELECT id, manager_name, employee_name, session_date,
           employee_data, manager_data, categories
    FROM sessions
"#;

/// PostgreSQL implementation of SessionStore.
#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        // Records are immutable; a retried save of the same id is a no-op.
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, manager_name, employee_name, session_date,
                employee_data, manager_data, categories
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.manager_name())
        .bind(record.employee_name())
        .bind(record.session_date().as_datetime())
        .bind(Json(record.submission(PartyRole::Employee)))
        .bind(Json(record.submission(PartyRole::Manager)))
        .bind(Json(record.category_order()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let rows = sqlx::query(&format!("{} ORDER BY session_date DESC", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn list_by_pair(&self, a: &str, b: &str) -> Result<Vec<SessionRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"{}
            WHERE (LOWER(TRIM(manager_name)) = $1 AND LOWER(TRIM(employee_name)) = $2)
               OR (LOWER(TRIM(manager_name)) = $2 AND LOWER(TRIM(employee_name)) = $1)
            ORDER BY session_date DESC
            "#,
            SELECT_COLUMNS
        ))
        .bind(normalize_name(a))
        .bind(normalize_name(b))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_record).collect()
    }
}

fn row_to_record(row: sqlx::postgres::PgRow) -> Result<SessionRecord, StoreError> {
    let id: uuid::Uuid = row.try_get("id")?;
    let session_date: chrono::DateTime<chrono::Utc> = row.try_get("session_date")?;
    let Json(employee): Json<PartySubmission> = row.try_get("employee_data")?;
    let Json(manager): Json<PartySubmission> = row.try_get("manager_data")?;
    let Json(categories): Json<Vec<Category>> = row.try_get("categories")?;

    Ok(SessionRecord::reconstitute(
        SessionRecordId::from_uuid(id),
        row.try_get("manager_name")?,
        row.try_get("employee_name")?,
        Timestamp::from_datetime(session_date),
        employee,
        manager,
        categories,
    ))
}
