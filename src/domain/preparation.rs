//! Preparation submissions.
//!
//! Each party privately rates every category before the session. A
//! submission belongs to exactly one role and is stored under the pairing's
//! symmetric key; resubmitting replaces the previous one wholesale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::category::CategoryRegistry;
use crate::domain::foundation::{PartyRole, Rating, Timestamp, ValidationError};

/// Maximum length for a party name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Order-insensitive identity of a pairing, used for preparation lookup.
///
/// Names are trimmed and compared case-insensitively, so
/// `PairingKey::new("Alice", "Bob") == PairingKey::new("bob ", "alice")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairingKey(String);

impl PairingKey {
    pub fn new(a: &str, b: &str) -> Self {
        let mut names = [normalize_name(a), normalize_name(b)];
        names.sort();
        Self(format!("{}::{}", names[0], names[1]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rebuilds a key read back from storage.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for PairingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trim and lowercase a person's name for identity comparisons.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One party's private ratings and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySubmission {
    pub name: String,
    pub partner_name: String,
    /// Partial: unrated categories are simply missing.
    #[serde(default)]
    pub ratings: BTreeMap<String, Rating>,
    /// Partial; empty strings are kept.
    #[serde(default)]
    pub comments: BTreeMap<String, String>,
    pub submitted_at: Timestamp,
}

impl PartySubmission {
    /// Creates a submission stamped with the current time.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if either name is blank
    /// - `InvalidFormat` if a name is longer than [`MAX_NAME_LENGTH`]
    pub fn new(
        name: &str,
        partner_name: &str,
        ratings: BTreeMap<String, Rating>,
        comments: BTreeMap<String, String>,
    ) -> Result<Self, ValidationError> {
        let name = validate_name("name", name)?;
        let partner_name = validate_name("partner", partner_name)?;

        Ok(Self {
            name,
            partner_name,
            ratings,
            comments,
            submitted_at: Timestamp::now(),
        })
    }

    /// Checks that every rated or commented category exists in the registry.
    pub fn validate_against(&self, registry: &CategoryRegistry) -> Result<(), ValidationError> {
        self.ratings
            .keys()
            .chain(self.comments.keys())
            .find(|name| !registry.contains(name))
            .map_or(Ok(()), |name| Err(ValidationError::unknown_category(name.clone())))
    }

    pub fn pairing_key(&self) -> PairingKey {
        PairingKey::new(&self.name, &self.partner_name)
    }

    pub fn rating(&self, category: &str) -> Option<Rating> {
        self.ratings.get(category).copied()
    }

    /// The comment for a category, treating an empty comment as none.
    pub fn comment(&self, category: &str) -> Option<&str> {
        self.comments
            .get(category)
            .map(String::as_str)
            .filter(|c| !c.trim().is_empty())
    }
}

fn validate_name(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::invalid_format(
            field,
            format!("must be {} characters or less", MAX_NAME_LENGTH),
        ));
    }
    Ok(trimmed.to_string())
}

/// Converts raw 1-5 values into ratings, naming the offending category.
pub fn ratings_from_raw(
    raw: BTreeMap<String, u8>,
) -> Result<BTreeMap<String, Rating>, ValidationError> {
    raw.into_iter()
        .map(|(category, value)| match Rating::try_from_u8(value) {
            Ok(rating) => Ok((category, rating)),
            Err(_) => Err(ValidationError::out_of_range(
                format!("ratings.{}", category),
                1,
                5,
                value as i32,
            )),
        })
        .collect()
}

/// Both parties' submissions for one pairing, merged by role.
///
/// A pair may be partial while the parties are still preparing; a session
/// can only start from a complete pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparationPair {
    pub employee: Option<PartySubmission>,
    pub manager: Option<PartySubmission>,
}

impl PreparationPair {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style insert; replaces whatever was stored for the role.
    pub fn with(mut self, role: PartyRole, submission: PartySubmission) -> Self {
        self.set(role, submission);
        self
    }

    pub fn set(&mut self, role: PartyRole, submission: PartySubmission) {
        match role {
            PartyRole::Employee => self.employee = Some(submission),
            PartyRole::Manager => self.manager = Some(submission),
        }
    }

    pub fn get(&self, role: PartyRole) -> Option<&PartySubmission> {
        match role {
            PartyRole::Employee => self.employee.as_ref(),
            PartyRole::Manager => self.manager.as_ref(),
        }
    }

    /// Roles that have not submitted yet, in reveal order.
    pub fn missing_roles(&self) -> Vec<PartyRole> {
        PartyRole::ALL
            .into_iter()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.employee.is_some() && self.manager.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.employee.is_none() && self.manager.is_none()
    }
}
