use std::fmt;

use serde::Serialize;

use crate::assessment::criteria::{Category, CountMap};
use crate::assessment::AssessmentError;

/// Coarse eligibility rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    High,
    Medium,
    Low,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rating::High => "high",
            Rating::Medium => "medium",
            Rating::Low => "low",
        })
    }
}

/// Rates a count map.
///
/// - more than three satisfied categories → high
/// - more than one Nobel Prize entry → high, whatever the other counts
/// - exactly three satisfied categories → medium
/// - otherwise → low
///
/// The Nobel Prize count is required; a map without it is rejected.
pub fn rate(counts: &CountMap) -> Result<Rating, AssessmentError> {
    let nobel = counts
        .get(Category::NobelPrize)
        .ok_or(AssessmentError::MissingCategory(Category::NobelPrize))?;
    let satisfied = counts.iter().filter(|(_, n)| *n > 0).count();

    let rating = if satisfied > 3 || nobel > 1 {
        Rating::High
    } else if satisfied == 3 {
        Rating::Medium
    } else {
        Rating::Low
    };
    Ok(rating)
}
