//! Supabase implementation of PreparationStore.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{PartyRole, Rating, Timestamp};
use crate::domain::preparation::{PairingKey, PartySubmission, PreparationPair};
use crate::ports::{PreparationStore, StoreError};

use super::client::{SupabaseClient, STORE_NAME};

const TABLE: &str = "preparations";

/// Row shape of the `preparations` table.
#[derive(Debug, Serialize, Deserialize)]
struct PreparationRow {
    prep_key: String,
    user_type: PartyRole,
    name: String,
    partner: String,
    #[serde(default)]
    ratings: BTreeMap<String, Rating>,
    #[serde(default)]
    comments: BTreeMap<String, String>,
    submitted_at: Timestamp,
}

impl PreparationRow {
    fn new(key: &PairingKey, role: PartyRole, submission: &PartySubmission) -> Self {
        Self {
            prep_key: key.as_str().to_string(),
            user_type: role,
            name: submission.name.clone(),
            partner: submission.partner_name.clone(),
            ratings: submission.ratings.clone(),
            comments: submission.comments.clone(),
            submitted_at: submission.submitted_at,
        }
    }

    fn into_submission(self) -> (PartyRole, PartySubmission) {
        (
            self.user_type,
            PartySubmission {
                name: self.name,
                partner_name: self.partner,
                ratings: self.ratings,
                comments: self.comments,
                submitted_at: self.submitted_at,
            },
        )
    }
}

/// Supabase (PostgREST) implementation of PreparationStore.
#[derive(Debug, Clone)]
pub struct SupabasePreparationStore {
    client: SupabaseClient,
}

impl SupabasePreparationStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PreparationStore for SupabasePreparationStore {
    fn name(&self) -> &str {
        STORE_NAME
    }

    async fn save(
        &self,
        key: &PairingKey,
        role: PartyRole,
        submission: &PartySubmission,
    ) -> Result<(), StoreError> {
        let row = PreparationRow::new(key, role, submission);
        let request = self
            .client
            .upsert(TABLE, "prep_key,user_type", true)
            .json(&[row]);
        self.client.send(request).await?;
        Ok(())
    }

    async fn load(&self, key: &PairingKey) -> Result<PreparationPair, StoreError> {
        let request = self
            .client
            .get(TABLE)
            .query(&[("select", "*".to_string()), ("prep_key", format!("eq.{}", key))]);
        let rows: Vec<PreparationRow> = self
            .client
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut pair = PreparationPair::empty();
        for row in rows {
            let (role, submission) = row.into_submission();
            pair.set(role, submission);
        }
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_serializes_with_table_column_names() {
        let mut ratings = BTreeMap::new();
        ratings.insert("Motivation".to_string(), Rating::Satisfied);
        let submission = PartySubmission::new("Eve", "Max", ratings, BTreeMap::new()).unwrap();
        let row = PreparationRow::new(&submission.pairing_key(), PartyRole::Employee, &submission);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["prep_key"], "eve::max");
        assert_eq!(json["user_type"], "employee");
        assert_eq!(json["ratings"]["Motivation"], 4);
    }

    #[test]
    fn row_without_maps_deserializes_as_empty() {
        let row: PreparationRow = serde_json::from_value(serde_json::json!({
            "prep_key": "eve::max",
            "user_type": "manager",
            "name": "Max",
            "partner": "Eve",
            "submitted_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        let (role, submission) = row.into_submission();
        assert_eq!(role, PartyRole::Manager);
        assert!(submission.ratings.is_empty());
    }
}
