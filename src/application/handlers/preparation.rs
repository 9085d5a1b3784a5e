//! Preparation handlers - submit and fetch party preparations.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::category::CategoryRegistry;
use crate::domain::foundation::{DomainError, PartyRole, ValidationError};
use crate::domain::preparation::{ratings_from_raw, PairingKey, PartySubmission, PreparationPair};
use crate::ports::PreparationStore;

/// Command to submit (or resubmit) one party's preparation.
#[derive(Debug, Clone)]
pub struct SubmitPreparationCommand {
    pub role: PartyRole,
    pub name: String,
    pub partner_name: String,
    /// Raw 1-5 values; unrated categories are simply absent.
    pub ratings: BTreeMap<String, u8>,
    pub comments: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct SubmitPreparationResult {
    pub key: PairingKey,
    pub submission: PartySubmission,
}

/// Handler for submitting preparations.
pub struct SubmitPreparationHandler {
    store: Arc<dyn PreparationStore>,
    registry: CategoryRegistry,
}

impl SubmitPreparationHandler {
    pub fn new(store: Arc<dyn PreparationStore>, registry: CategoryRegistry) -> Self {
        Self { store, registry }
    }

    pub async fn handle(
        &self,
        cmd: SubmitPreparationCommand,
    ) -> Result<SubmitPreparationResult, DomainError> {
        let ratings = ratings_from_raw(cmd.ratings)?;

        let submission = PartySubmission::new(&cmd.name, &cmd.partner_name, ratings, cmd.comments)?;
        submission.validate_against(&self.registry)?;

        let key = submission.pairing_key();
        self.store.save(&key, cmd.role, &submission).await?;

        info!(%key, role = cmd.role.as_str(), rated = submission.ratings.len(), "Preparation submitted");
        Ok(SubmitPreparationResult { key, submission })
    }
}

/// Query for the merged preparation pair of two people, in any order.
#[derive(Debug, Clone)]
pub struct GetPreparationQuery {
    pub first_name: String,
    pub second_name: String,
}

/// Handler for loading preparation pairs.
pub struct GetPreparationHandler {
    store: Arc<dyn PreparationStore>,
}

impl GetPreparationHandler {
    pub fn new(store: Arc<dyn PreparationStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetPreparationQuery) -> Result<PreparationPair, DomainError> {
        if query.first_name.trim().is_empty() {
            return Err(ValidationError::empty_field("first_name").into());
        }
        if query.second_name.trim().is_empty() {
            return Err(ValidationError::empty_field("second_name").into());
        }

        let key = PairingKey::new(&query.first_name, &query.second_name);
        Ok(self.store.load(&key).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryPreparationStore;
    use crate::domain::foundation::ErrorCode;

    fn command(role: PartyRole, name: &str, partner: &str, ratings: &[(&str, u8)]) -> SubmitPreparationCommand {
        SubmitPreparationCommand {
            role,
            name: name.to_string(),
            partner_name: partner.to_string(),
            ratings: ratings.iter().map(|(c, v)| (c.to_string(), *v)).collect(),
            comments: BTreeMap::new(),
        }
    }

    fn handlers() -> (SubmitPreparationHandler, GetPreparationHandler) {
        let store = Arc::new(InMemoryPreparationStore::new());
        (
            SubmitPreparationHandler::new(store.clone(), CategoryRegistry::standard()),
            GetPreparationHandler::new(store),
        )
    }

    #[tokio::test]
    async fn submitted_pair_loads_in_either_order() {
        let (submit, get) = handlers();
        submit
            .handle(command(PartyRole::Employee, "Alice", "Bob", &[("Motivation", 4)]))
            .await
            .unwrap();
        submit
            .handle(command(PartyRole::Manager, "Bob", "Alice", &[("Motivation", 2)]))
            .await
            .unwrap();

        let ab = get
            .handle(GetPreparationQuery {
                first_name: "Alice".into(),
                second_name: "Bob".into(),
            })
            .await
            .unwrap();
        let ba = get
            .handle(GetPreparationQuery {
                first_name: "Bob".into(),
                second_name: "Alice".into(),
            })
            .await
            .unwrap();
        assert_eq!(ab, ba);
        assert!(ab.is_complete());
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let (submit, _) = handlers();
        let err = submit
            .handle(command(PartyRole::Employee, "Alice", "Bob", &[("Motivation", 0)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field").map(String::as_str), Some("ratings.Motivation"));
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let (submit, _) = handlers();
        let err = submit
            .handle(command(PartyRole::Employee, "Alice", "Bob", &[("Salary", 3)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (submit, get) = handlers();
        assert!(submit
            .handle(command(PartyRole::Employee, " ", "Bob", &[]))
            .await
            .is_err());
        assert!(get
            .handle(GetPreparationQuery {
                first_name: "".into(),
                second_name: "Bob".into(),
            })
            .await
            .is_err());
    }
}
