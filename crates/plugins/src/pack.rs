//! Pack archives: the compiled-unit containers inside an unpacked bundle.

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use {flate2::read::GzDecoder, tar::Archive};

use crate::error::Result;

/// File suffix identifying a compiled unit inside a pack.
pub const UNIT_SUFFIX: &str = ".unit";

/// Separator between segments of a unit's qualified name.
pub const NAME_SEPARATOR: &str = "::";

/// A pack archive, read once and indexed by qualified unit name.
///
/// The whole archive is consumed up front so the file handle is released
/// before `open` returns, whatever happens to the units afterwards.
pub struct Pack {
    path: PathBuf,
    units: Vec<(String, Vec<u8>)>,
}

impl Pack {
    /// Read a pack archive, collecting unit entries in archive order.
    pub fn open(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;
        let mut archive = Archive::new(GzDecoder::new(file));

        let mut units = Vec::new();
        for entry in archive.entries()? {
            let mut entry = entry?;
            if entry.header().entry_type().is_dir() {
                continue;
            }
            let Some(name) = unit_name(&entry.path()?) else {
                continue;
            };
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            units.push((name, data));
        }

        Ok(Self {
            path: path.to_path_buf(),
            units,
        })
    }

    /// Qualified names of every unit, in archive order.
    pub fn unit_names(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|(name, _)| name.as_str())
    }

    /// Raw descriptor bytes of a unit, if this pack provides it.
    pub fn unit(&self, name: &str) -> Option<&[u8]> {
        self.units
            .iter()
            .find(|(unit, _)| unit == name)
            .map(|(_, data)| data.as_slice())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Derive a qualified unit name from an archive-relative path.
///
/// Path separators become name separators and the unit suffix is dropped:
/// `text/Sentiment.unit` → `text::Sentiment`. A single leading separator
/// left behind by absolute entry paths is stripped. Entries without the
/// unit suffix are not units.
fn unit_name(path: &Path) -> Option<String> {
    let raw = path.to_string_lossy();
    let stripped = raw.strip_suffix(UNIT_SUFFIX)?;
    let name = stripped.replace('/', NAME_SEPARATOR);
    let name = name.strip_prefix(NAME_SEPARATOR).unwrap_or(&name);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
