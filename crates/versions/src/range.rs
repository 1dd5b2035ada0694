//! Structured version ranges with graceful degradation for opaque literals.

use semver::{Version, VersionReq};

/// A version-range expression, parsed eagerly on construction.
///
/// Expressions that parse as semver requirements support containment
/// testing. Anything else (empty strings, free-form literals like
/// `some-version`) reports `is_valid() == false` instead of failing, so
/// callers can fall back to ordinal comparison.
#[derive(Debug, Clone)]
pub struct VersionRange {
    raw: String,
    req: Option<VersionReq>,
}

impl VersionRange {
    pub fn new(expression: &str) -> Self {
        let trimmed = expression.trim();
        let req = if trimmed.is_empty() {
            None
        } else {
            VersionReq::parse(trimmed).ok()
        };
        Self {
            raw: expression.to_string(),
            req,
        }
    }

    /// Whether the expression parsed as a structured range.
    pub fn is_valid(&self) -> bool {
        self.req.is_some()
    }

    /// The expression as given.
    pub fn expression(&self) -> &str {
        &self.raw
    }

    /// Whether a concrete version lies inside the range.
    ///
    /// Invalid ranges contain nothing, and so do versions that cannot be
    /// read as a version number even leniently.
    pub fn contains(&self, version: &str) -> bool {
        match (&self.req, parse_lenient(version)) {
            (Some(req), Some(version)) => req.matches(&version),
            _ => false,
        }
    }
}

/// Parse a concrete version leniently: a leading `v` is stripped and missing
/// minor/patch components are zero-padded (`1.2` → `1.2.0`).
fn parse_lenient(version: &str) -> Option<Version> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let dots = trimmed.chars().filter(|c| *c == '.').count();
    if dots < 2
        && !trimmed.is_empty()
        && trimmed.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        let mut padded = trimmed.to_string();
        for _ in dots..2 {
            padded.push_str(".0");
        }
        return Version::parse(&padded).ok();
    }

    None
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_literal_is_valid() {
        let range = VersionRange::new("=1.2.3");
        assert!(range.is_valid());
        assert!(range.contains("1.2.3"));
        assert!(!range.contains("1.2.4"));
    }

    #[test]
    fn at_least_form() {
        let range = VersionRange::new(">=1.2");
        assert!(range.is_valid());
        assert!(range.contains("1.2.0"));
        assert!(range.contains("2.0.0"));
        assert!(!range.contains("1.1.9"));
    }

    #[test]
    fn at_most_form() {
        let range = VersionRange::new("<=2.0");
        assert!(range.is_valid());
        assert!(range.contains("2.0.0"));
        assert!(range.contains("0.1.0"));
        assert!(!range.contains("2.0.1"));
    }

    #[test]
    fn closed_interval_form() {
        let range = VersionRange::new(">=1.2, <2.0");
        assert!(range.is_valid());
        assert!(range.contains("1.2.0"));
        assert!(range.contains("1.9.9"));
        assert!(!range.contains("2.0.0"));
        assert!(!range.contains("1.1.0"));
    }

    #[test]
    fn opaque_literal_is_invalid_not_an_error() {
        assert!(!VersionRange::new("some-version").is_valid());
        assert!(!VersionRange::new("one.two.three").is_valid());
        assert!(!VersionRange::new("").is_valid());
        assert!(!VersionRange::new("   ").is_valid());
    }

    #[test]
    fn invalid_range_contains_nothing() {
        let range = VersionRange::new("some-version");
        assert!(!range.contains("some-version"));
        assert!(!range.contains("1.0.0"));
    }

    #[test]
    fn lenient_version_parsing() {
        let range = VersionRange::new(">=1.2");
        assert!(range.contains("v1.3.0"));
        assert!(range.contains("1.2"));
        assert!(range.contains("2"));
        assert!(!range.contains("1"));
    }

    #[test]
    fn unreadable_version_is_not_contained() {
        let range = VersionRange::new(">=1.0");
        assert!(!range.contains("not-a-version"));
        assert!(!range.contains(""));
    }

    #[test]
    fn expression_is_preserved_verbatim() {
        let range = VersionRange::new(" >=1.0 ");
        assert_eq!(range.expression(), " >=1.0 ");
    }
}
