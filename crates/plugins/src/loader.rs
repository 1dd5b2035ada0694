//! Isolated unit loading.
//!
//! A [`UnitLoader`] is built per scan over a scoped search path of packs and
//! never shared: a bundle's units resolve only against its own packs, so
//! they cannot collide with the host's code or another bundle's. Unit
//! descriptors are TOML:
//!
//! ```text
//! description = "Scores text sentiment"
//! contracts = ["plugin", "text::Analyzer"]
//! ```
//!
//! Parsing the descriptor is the unit's one-time initialization. It runs
//! exactly once per unit per loader, before any capability testing, and is
//! observable through [`UnitLoader::initializations`].

use std::{collections::HashMap, path::PathBuf};

use {serde::Deserialize, tracing::debug};

use crate::{
    error::{Error, Result},
    pack::Pack,
    types::ExtensionPoint,
};

/// A code unit loaded through an isolated context: its qualified name and
/// the contracts it declares itself capable of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedUnit {
    name: String,
    description: Option<String>,
    contracts: Vec<ExtensionPoint>,
}

impl LoadedUnit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn contracts(&self) -> &[ExtensionPoint] {
        &self.contracts
    }

    /// Capability test: does this unit implement the given contract?
    pub fn satisfies(&self, point: &ExtensionPoint) -> bool {
        self.contracts.contains(point)
    }
}

/// On-disk unit descriptor.
#[derive(Deserialize)]
struct UnitDescriptor {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    contracts: Vec<String>,
}

/// Loads units by qualified name from a scoped search path of packs.
pub struct UnitLoader {
    search_path: Vec<Pack>,
    loaded: HashMap<String, LoadedUnit>,
    initializations: u64,
}

impl UnitLoader {
    pub fn from_packs(search_path: Vec<Pack>) -> Self {
        Self {
            search_path,
            loaded: HashMap::new(),
            initializations: 0,
        }
    }

    /// Open every pack at the given paths, preserving search order.
    pub fn open(paths: &[PathBuf]) -> Result<Self> {
        let mut packs = Vec::with_capacity(paths.len());
        for path in paths {
            packs.push(Pack::open(path)?);
        }
        Ok(Self::from_packs(packs))
    }

    /// Load a unit by qualified name, initializing it on first load.
    ///
    /// Packs are searched in path order; the first one providing the unit
    /// wins. Repeat loads return the already-initialized unit.
    pub fn load(&mut self, name: &str) -> Result<&LoadedUnit> {
        if !self.loaded.contains_key(name) {
            let unit = self.initialize(name)?;
            self.initializations += 1;
            debug!(unit = name, "initialized unit");
            self.loaded.insert(name.to_string(), unit);
        }
        self.loaded
            .get(name)
            .ok_or_else(|| Error::unit_not_found(name))
    }

    fn initialize(&self, name: &str) -> Result<LoadedUnit> {
        let data = self
            .search_path
            .iter()
            .find_map(|pack| pack.unit(name))
            .ok_or_else(|| Error::unit_not_found(name))?;
        let text = std::str::from_utf8(data)
            .map_err(|_| Error::message(format!("descriptor of unit '{name}' is not UTF-8")))?;
        let descriptor: UnitDescriptor =
            toml::from_str(text).map_err(|source| Error::UnitParse {
                name: name.to_string(),
                source,
            })?;

        Ok(LoadedUnit {
            name: name.to_string(),
            description: descriptor.description,
            contracts: descriptor
                .contracts
                .into_iter()
                .map(ExtensionPoint::new)
                .collect(),
        })
    }

    /// Number of unit initializations performed by this loader.
    pub fn initializations(&self) -> u64 {
        self.initializations
    }
}
