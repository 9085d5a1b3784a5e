//! Rating value object for the 1-5 satisfaction scale, plus the alignment
//! metric used to compare two parties' ratings of the same category.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Lowest value on the scale.
pub const MIN_RATING: u8 = 1;

/// Highest value on the scale.
pub const MAX_RATING: u8 = 5;

/// Satisfaction rating: 1 (very dissatisfied) to 5 (very satisfied).
///
/// A category that was not rated is modelled as `Option<Rating>::None`,
/// never as a zero rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Rating {
    VeryDissatisfied = 1,
    Dissatisfied = 2,
    Neutral = 3,
    Satisfied = 4,
    VerySatisfied = 5,
}

impl Rating {
    /// All ratings in ascending order.
    pub const ALL: [Rating; 5] = [
        Rating::VeryDissatisfied,
        Rating::Dissatisfied,
        Rating::Neutral,
        Rating::Satisfied,
        Rating::VerySatisfied,
    ];

    /// Creates a Rating from an integer, returning error if out of range.
    pub fn try_from_u8(value: u8) -> Result<Self, ValidationError> {
        match value {
            1 => Ok(Rating::VeryDissatisfied),
            2 => Ok(Rating::Dissatisfied),
            3 => Ok(Rating::Neutral),
            4 => Ok(Rating::Satisfied),
            5 => Ok(Rating::VerySatisfied),
            _ => Err(ValidationError::out_of_range(
                "rating",
                MIN_RATING as i32,
                MAX_RATING as i32,
                value as i32,
            )),
        }
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            Rating::VeryDissatisfied => "Very Dissatisfied",
            Rating::Dissatisfied => "Dissatisfied",
            Rating::Neutral => "Neutral",
            Rating::Satisfied => "Satisfied",
            Rating::VerySatisfied => "Very Satisfied",
        }
    }

    /// Absolute distance between two ratings on the scale.
    pub fn gap(&self, other: &Rating) -> u8 {
        self.value().abs_diff(other.value())
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::try_from_u8(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// How close two ratings for the same category are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Both parties gave the same rating.
    Perfect,
    /// One point apart.
    Close,
    /// Two or more points apart.
    Large,
    /// At least one party did not rate the category.
    Incomparable,
}

impl Alignment {
    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            Alignment::Perfect => "Perfect alignment",
            Alignment::Close => "Close alignment",
            Alignment::Large => "Significant difference",
            Alignment::Incomparable => "Not comparable",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classifies the distance between two possibly-absent ratings.
pub fn distance(a: Option<Rating>, b: Option<Rating>) -> Alignment {
    match difference(a, b) {
        None => Alignment::Incomparable,
        Some(0) => Alignment::Perfect,
        Some(1) => Alignment::Close,
        Some(_) => Alignment::Large,
    }
}

/// Numeric gap between two ratings, absent when either side is absent.
pub fn difference(a: Option<Rating>, b: Option<Rating>) -> Option<u8> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.gap(&b)),
        _ => None,
    }
}

/// Mean over the present ratings only.
///
/// Returns `0.0` when no rating is present; use [`present_count`] to tell
/// that apart from real data.
pub fn average<I>(ratings: I) -> f64
where
    I: IntoIterator<Item = Option<Rating>>,
{
    let (sum, count) = ratings
        .into_iter()
        .flatten()
        .fold((0u32, 0u32), |(sum, count), r| (sum + r.value() as u32, count + 1));

    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Number of present ratings in a sequence.
pub fn present_count<I>(ratings: I) -> usize
where
    I: IntoIterator<Item = Option<Rating>>,
{
    ratings.into_iter().flatten().count()
}
