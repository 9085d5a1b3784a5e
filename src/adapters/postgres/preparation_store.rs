//! PostgreSQL implementation of PreparationStore.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;

use crate::domain::foundation::{PartyRole, Rating, Timestamp};
use crate::domain::preparation::{PairingKey, PartySubmission, PreparationPair};
use crate::ports::{PreparationStore, StoreError};

/// PostgreSQL implementation of PreparationStore.
#[derive(Clone)]
pub struct PostgresPreparationStore {
    pool: PgPool,
}

impl PostgresPreparationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreparationStore for PostgresPreparationStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn save(
        &self,
        key: &PairingKey,
        role: PartyRole,
        submission: &PartySubmission,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO preparations (
                prep_key, user_type, name, partner, ratings, comments, submitted_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (prep_key, user_type) DO UPDATE SET
                name = EXCLUDED.name,
                partner = EXCLUDED.partner,
                ratings = EXCLUDED.ratings,
                comments = EXCLUDED.comments,
                submitted_at = EXCLUDED.submitted_at,
                updated_at = NOW()
            "#,
        )
        .bind(key.as_str())
        .bind(role.as_str())
        .bind(&submission.name)
        .bind(&submission.partner_name)
        .bind(Json(&submission.ratings))
        .bind(Json(&submission.comments))
        .bind(submission.submitted_at.as_datetime())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load(&self, key: &PairingKey) -> Result<PreparationPair, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT user_type, name, partner, ratings, comments, submitted_at
            FROM preparations
            WHERE prep_key = $1
            "#,
        )
        .bind(key.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut pair = PreparationPair::empty();
        for row in rows {
            let (role, submission) = row_to_submission(row)?;
            pair.set(role, submission);
        }
        Ok(pair)
    }
}

fn row_to_submission(row: sqlx::postgres::PgRow) -> Result<(PartyRole, PartySubmission), StoreError> {
    let user_type: String = row.try_get("user_type")?;
    let role: PartyRole = user_type
        .parse()
        .map_err(|e| StoreError::Database(format!("Invalid user_type '{}': {}", user_type, e)))?;

    let Json(ratings): Json<BTreeMap<String, Rating>> = row.try_get("ratings")?;
    let Json(comments): Json<BTreeMap<String, String>> = row.try_get("comments")?;
    let submitted_at: chrono::DateTime<chrono::Utc> = row.try_get("submitted_at")?;

    Ok((
        role,
        PartySubmission {
            name: row.try_get("name")?,
            partner_name: row.try_get("partner")?,
            ratings,
            comments,
            submitted_at: Timestamp::from_datetime(submitted_at),
        },
    ))
}
