//! Required-vs-actual version comparison.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::range::VersionRange;

/// How an actual version relates to a required version specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionRelation {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    InRange,
    NotInRange,
}

impl VersionRelation {
    /// The relations a dependency checker accepts as satisfied.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, VersionRelation::Equal | VersionRelation::InRange)
    }
}

/// Compare a required version specifier against an actual version.
///
/// No requirement is always satisfied; a requirement against no version at
/// all is not. A specifier that parses as a structured range is tested by
/// containment; anything else falls back to ordinal string comparison.
/// Pure and deterministic.
pub fn compare(required: Option<&str>, actual: Option<&str>) -> VersionRelation {
    let required = match required {
        Some(required) if !required.is_empty() => required,
        _ => return VersionRelation::InRange,
    };
    let actual = match actual {
        Some(actual) if !actual.is_empty() => actual,
        _ => return VersionRelation::NotEqual,
    };

    let range = VersionRange::new(required);
    if range.is_valid() {
        return if range.contains(actual) {
            VersionRelation::InRange
        } else {
            VersionRelation::NotInRange
        };
    }

    match actual.cmp(required) {
        Ordering::Greater => VersionRelation::GreaterThan,
        Ordering::Less => VersionRelation::LessThan,
        Ordering::Equal => VersionRelation::Equal,
    }
}
