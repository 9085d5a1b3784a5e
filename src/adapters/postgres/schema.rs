//! Table definitions for the PostgreSQL stores.

use sqlx::PgPool;
use tracing::info;

use crate::ports::StoreError;

const CREATE_PREPARATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS preparations (
    prep_key     TEXT        NOT NULL,
    user_type    TEXT        NOT NULL CHECK (user_type IN ('employee', 'manager')),
    name         TEXT        NOT NULL,
    partner      TEXT        NOT NULL,
    ratings      JSONB       NOT NULL DEFAULT '{}'::jsonb,
    comments     JSONB       NOT NULL DEFAULT '{}'::jsonb,
    submitted_at TIMESTAMPTZ NOT NULL,
    updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (prep_key, user_type)
)
"#;

const CREATE_SESSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id            UUID        PRIMARY KEY,
    manager_name  TEXT        NOT NULL,
    employee_name TEXT        NOT NULL,
    session_date  TIMESTAMPTZ NOT NULL,
    employee_data JSONB       NOT NULL,
    manager_data  JSONB       NOT NULL,
    categories    JSONB       NOT NULL
)
"#;

const CREATE_SESSIONS_DATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS sessions_session_date_idx ON sessions (session_date DESC)";

/// Creates the store tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in [CREATE_PREPARATIONS, CREATE_SESSIONS, CREATE_SESSIONS_DATE_INDEX] {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("PostgreSQL schema ready");
    Ok(())
}
