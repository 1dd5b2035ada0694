//! Extension-point scanning over plugin bundles.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    cache::ArchiveCache,
    error::{Error, Result},
    loader::{LoadedUnit, UnitLoader},
    pack::Pack,
    types::ExtensionPoint,
};

/// Conventional name of the main code pack inside an unpacked bundle.
pub const CODE_PACK: &str = "plugin.pack";

/// Conventional directory of bundled library packs.
pub const LIB_DIRECTORY: &str = "lib";

/// Discovers which units of a plugin bundle implement which extension
/// points.
pub struct PluginScanner {
    cache: ArchiveCache,
}

impl PluginScanner {
    /// A scanner unpacking bundles under the given cache directory.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache: ArchiveCache::new(cache_dir),
        }
    }

    /// Scan a bundle and map every extension point to the units
    /// implementing it.
    ///
    /// The base `plugin` contract is always scanned for, whether listed or
    /// not. Contracts nothing implements are absent from the map. One unit
    /// failing to load aborts the whole scan, so the map is never silently
    /// incomplete. Every failure surfaces as a single wrapped error
    /// carrying the underlying cause.
    pub fn scan(
        &self,
        bundle: &Path,
        extension_points: &[ExtensionPoint],
    ) -> Result<HashMap<ExtensionPoint, Vec<LoadedUnit>>> {
        self.scan_units(bundle, extension_points)
            .map_err(|source| Error::plugin(bundle, source))
    }

    fn scan_units(
        &self,
        bundle: &Path,
        extension_points: &[ExtensionPoint],
    ) -> Result<HashMap<ExtensionPoint, Vec<LoadedUnit>>> {
        let mut points = extension_points.to_vec();
        let base = ExtensionPoint::plugin();
        if !points.contains(&base) {
            points.push(base);
        }

        let unpacked = self.cache.resolve(bundle)?;

        let mut search_path = lib_packs(&unpacked)?;
        let main = Pack::open(&unpacked.join(CODE_PACK))?;
        let unit_names: Vec<String> = main.unit_names().map(str::to_string).collect();
        search_path.push(main);
        let mut loader = UnitLoader::from_packs(search_path);

        let mut matches: HashMap<ExtensionPoint, Vec<LoadedUnit>> = HashMap::new();
        for name in &unit_names {
            let unit = loader.load(name)?.clone();
            for point in &points {
                if unit.satisfies(point) {
                    matches.entry(point.clone()).or_default().push(unit.clone());
                }
            }
        }

        debug!(
            ?bundle,
            units = unit_names.len(),
            points = points.len(),
            "scanned plugin bundle"
        );
        Ok(matches)
    }
}

/// Library packs directly under `lib/`, sorted by file name so the search
/// path is stable across platforms.
fn lib_packs(unpacked: &Path) -> Result<Vec<Pack>> {
    let lib = unpacked.join(LIB_DIRECTORY);
    if !lib.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(&lib)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut packs = Vec::with_capacity(paths.len());
    for path in &paths {
        packs.push(Pack::open(path)?);
    }
    Ok(packs)
}
