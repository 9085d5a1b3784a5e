//! Party role in a one-to-one pairing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Which side of the pairing a submission or reveal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Employee,
    Manager,
}

impl PartyRole {
    /// Both roles, in reveal order.
    pub const ALL: [PartyRole; 2] = [PartyRole::Employee, PartyRole::Manager];

    /// Stable storage identifier (`employee` / `manager`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyRole::Employee => "employee",
            PartyRole::Manager => "manager",
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            PartyRole::Employee => "Employee",
            PartyRole::Manager => "Manager",
        }
    }

    /// The other side of the pairing.
    pub fn counterpart(&self) -> PartyRole {
        match self {
            PartyRole::Employee => PartyRole::Manager,
            PartyRole::Manager => PartyRole::Employee,
        }
    }
}

impl fmt::Display for PartyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PartyRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(PartyRole::Employee),
            "manager" => Ok(PartyRole::Manager),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("expected 'employee' or 'manager', got '{}'", other),
            )),
        }
    }
}
