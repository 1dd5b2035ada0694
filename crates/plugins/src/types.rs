//! Core value types of the plugin loader.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

/// Name of the base contract every plugin bundle is expected to implement.
pub const PLUGIN_CONTRACT: &str = "plugin";

/// A named reference from one plugin to another it requires or conflicts
/// with, optionally pinned to a version specifier.
///
/// Identity is the name alone: two records naming the same plugin are the
/// same dependency no matter which version each requests. Immutable once
/// constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn versioned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

// Equality and hashing deliberately ignore the version.
impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A capability contract plugin units may implement, identified by its
/// qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionPoint(String);

impl ExtensionPoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The base plugin contract, implicitly part of every scan.
    pub fn plugin() -> Self {
        Self(PLUGIN_CONTRACT.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExtensionPoint {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
