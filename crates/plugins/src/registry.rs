//! Plugin registry collaborators.
//!
//! The loader never stores plugin metadata itself; it reads an embedder's
//! registry through the narrow traits here. [`InMemoryRegistry`] is a plain
//! map-backed implementation for embedders and tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Dependency;

/// Metadata a host exposes for a known plugin.
pub trait PluginMetadata {
    /// The plugin's registry name.
    fn name(&self) -> &str;

    /// The plugin's own version, if it declares one.
    fn version(&self) -> Option<&str>;

    /// Plugins this one needs present, in declaration order.
    fn required_dependencies(&self) -> &[Dependency];

    /// Plugins this one cannot coexist with, in declaration order.
    fn conflicting_dependencies(&self) -> &[Dependency];
}

/// Read-only lookup over the plugins a host already knows about.
pub trait PluginRegistry {
    fn plugin(&self, name: &str) -> Option<&dyn PluginMetadata>;
}

/// Plain owned metadata record, for registries populated by hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginRecord {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub requires: Vec<Dependency>,
    #[serde(default)]
    pub conflicts: Vec<Dependency>,
}

impl PluginRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn requiring(mut self, dependency: Dependency) -> Self {
        self.requires.push(dependency);
        self
    }

    pub fn conflicting_with(mut self, dependency: Dependency) -> Self {
        self.conflicts.push(dependency);
        self
    }
}

impl PluginMetadata for PluginRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn required_dependencies(&self) -> &[Dependency] {
        &self.requires
    }

    fn conflicting_dependencies(&self) -> &[Dependency] {
        &self.conflicts
    }
}

/// In-memory registry backed by a name-keyed map.
#[derive(Default)]
pub struct InMemoryRegistry {
    plugins: HashMap<String, Box<dyn PluginMetadata + Send + Sync>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under its own name, replacing any previous entry.
    pub fn insert(&mut self, metadata: impl PluginMetadata + Send + Sync + 'static) {
        self.plugins
            .insert(metadata.name().to_string(), Box::new(metadata));
    }
}

impl PluginRegistry for InMemoryRegistry {
    fn plugin(&self, name: &str) -> Option<&dyn PluginMetadata> {
        self.plugins
            .get(name)
            .map(|metadata| metadata.as_ref() as &dyn PluginMetadata)
    }
}
