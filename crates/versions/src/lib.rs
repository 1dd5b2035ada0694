//! Version relations and range containment for plugin dependency checking.
//!
//! A required version specifier is either a structured range (`=1.2.3`,
//! `>=1.2`, `<=2.0`, `>=1.2, <2.0`, ...) or an opaque literal. Ranges are
//! tested by containment; literals fall back to plain ordinal comparison.

pub mod compare;
pub mod range;
