//! Category registry.
//!
//! The registry is the fixed, ordered list of categories both parties rate.
//! Its order drives the preparation form, the reveal sequence and the report
//! rows. It has no mutation API: a different set of categories means a new
//! registry.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::ValidationError;

/// A rated category. The name is the identity key used by every
/// category-keyed map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub description: String,
}

impl Category {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

static STANDARD: Lazy<CategoryRegistry> = Lazy::new(|| CategoryRegistry {
    categories: vec![
        Category::new(
            "Job Satisfaction",
            "How satisfied are you with your current role and responsibilities?",
        ),
        Category::new(
            "Recognition",
            "How well do you feel your contributions are recognized and appreciated?",
        ),
        Category::new(
            "Empowerment",
            "How empowered do you feel to make decisions and take initiative?",
        ),
        Category::new(
            "Personal Development",
            "How satisfied are you with opportunities for learning and growth?",
        ),
        Category::new(
            "Motivation",
            "How motivated do you feel in your current position?",
        ),
        Category::new(
            "Work/Life Balance",
            "How well are you able to balance work demands with personal life?",
        ),
    ],
});

/// Ordered, read-only set of categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    /// Builds a registry from an ordered list.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the list is empty or a name is blank
    /// - `InvalidFormat` if two categories share a name
    pub fn new(categories: Vec<Category>) -> Result<Self, ValidationError> {
        if categories.is_empty() {
            return Err(ValidationError::empty_field("categories"));
        }

        let mut seen = HashSet::new();
        for category in &categories {
            if category.name.trim().is_empty() {
                return Err(ValidationError::empty_field("category.name"));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(ValidationError::invalid_format(
                    "categories",
                    format!("duplicate category '{}'", category.name),
                ));
            }
        }

        Ok(Self { categories })
    }

    /// The six categories of the standard one-to-one check-in.
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.categories.iter()
    }

    /// Position of a category in the reveal order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Frozen copy of the current order, stored with each session record.
    pub fn snapshot(&self) -> Vec<Category> {
        self.categories.clone()
    }
}

impl<'a> IntoIterator for &'a CategoryRegistry {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
