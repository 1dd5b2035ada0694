//! Content cache of unpacked plugin bundles.

use std::{
    fs,
    path::{Component, Path, PathBuf},
    time::SystemTime,
};

use {
    flate2::read::GzDecoder,
    tar::Archive,
    tracing::{debug, info, warn},
};

use crate::error::{Error, Result};

/// Unpacks plugin bundles into a cache directory, reusing fresh entries.
///
/// Entries are keyed by the bundle's file stem and considered fresh while
/// their modification time is strictly newer than the bundle's. Stale
/// entries are removed entirely and rebuilt, never overwritten in place.
/// Resolving the same bundle from several threads is not serialized here;
/// callers sharing a cache root must lock per bundle.
pub struct ArchiveCache {
    root: PathBuf,
}

impl ArchiveCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the unpacked directory for a bundle, extracting it first if
    /// the cache has no fresh entry.
    pub fn resolve(&self, bundle: &Path) -> Result<PathBuf> {
        let entry = self.root.join(entry_name(bundle)?);

        if entry.exists() {
            if !entry.is_dir() {
                return Err(Error::CacheCorruption { path: entry });
            }
            if modified(&entry)? > modified(bundle)? {
                debug!(?bundle, ?entry, "bundle cache hit");
                return Ok(entry);
            }
            fs::remove_dir_all(&entry)?;
        }

        fs::create_dir_all(&entry)?;
        unpack(bundle, &entry)?;
        info!(?bundle, ?entry, "unpacked plugin bundle");
        Ok(entry)
    }
}

/// Cache entry name: the bundle file name with its extension stripped.
fn entry_name(bundle: &Path) -> Result<String> {
    match bundle.file_stem() {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string_lossy().into_owned()),
        _ => Err(Error::message(format!(
            "bundle path {} has no usable file name",
            bundle.display()
        ))),
    }
}

fn modified(path: &Path) -> Result<SystemTime> {
    Ok(fs::metadata(path)?.modified()?)
}

/// Stream every entry of a gzipped tar bundle under `dest`.
///
/// Directory entries create directories only; symlinks and hardlinks are
/// skipped; entries that would escape `dest` are rejected.
fn unpack(bundle: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(bundle)?;
    let mut archive = Archive::new(GzDecoder::new(file));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let kind = entry.header().entry_type();
        if kind.is_symlink() || kind.is_hard_link() {
            warn!(?bundle, "skipping symlink/hardlink bundle entry");
            continue;
        }

        let path = entry.path()?.into_owned();
        let Some(relative) = checked_entry_path(&path)? else {
            continue;
        };

        let out = dest.join(&relative);
        if kind.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }

        if let Some(parent) = out.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        entry.unpack(&out)?;
    }

    Ok(())
}

/// Reject entry paths that could escape the destination directory.
fn checked_entry_path(path: &Path) -> Result<Option<PathBuf>> {
    if path.as_os_str().is_empty() {
        return Ok(None);
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {},
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::message(format!(
                    "bundle entry has unsafe path: {}",
                    path.display()
                )));
            },
        }
    }
    Ok(Some(path.to_path_buf()))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::time::Duration;

    use {
        super::*,
        flate2::{Compression, write::GzEncoder},
    };

    fn write_bundle(path: &Path, files: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn shift_mtime(path: &Path, offset: i64) {
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        let time = if offset >= 0 {
            SystemTime::now() + Duration::from_secs(offset as u64)
        } else {
            SystemTime::now() - Duration::from_secs(offset.unsigned_abs())
        };
        file.set_modified(time).unwrap();
    }

    #[test]
    fn fresh_root_extracts_fully() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = tmp.path().join("demo.plug");
        write_bundle(&bundle, &[("plugin.pack", b"pack"), ("lib/util.pack", b"lib")]);

        let cache = ArchiveCache::new(tmp.path().join(".cache"));
        let entry = cache.resolve(&bundle).unwrap();

        assert_eq!(entry, tmp.path().join(".cache/demo"));
        assert_eq!(fs::read(entry.join("plugin.pack")).unwrap(), b"pack");
        assert_eq!(fs::read(entry.join("lib/util.pack")).unwrap(), b"lib");
    }

    #[test]
    fn fresh_entry_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = tmp.path().join("demo.plug");
        write_bundle(&bundle, &[("plugin.pack", b"pack")]);
        // Backdate the bundle so the first extraction is unambiguously newer.
        shift_mtime(&bundle, -3600);

        let cache = ArchiveCache::new(tmp.path().join(".cache"));
        let entry = cache.resolve(&bundle).unwrap();

        let sentinel = entry.join("sentinel");
        fs::write(&sentinel, b"still here").unwrap();

        let again = cache.resolve(&bundle).unwrap();
        assert_eq!(again, entry);
        assert_eq!(fs::read(&sentinel).unwrap(), b"still here");
    }

    #[test]
    fn stale_entry_is_rebuilt_from_scratch() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = tmp.path().join("demo.plug");
        write_bundle(&bundle, &[("plugin.pack", b"pack")]);

        let cache = ArchiveCache::new(tmp.path().join(".cache"));
        let entry = cache.resolve(&bundle).unwrap();
        fs::write(entry.join("sentinel"), b"stale").unwrap();

        // Touch the bundle into the future: the entry is now stale.
        shift_mtime(&bundle, 3600);

        let rebuilt = cache.resolve(&bundle).unwrap();
        assert_eq!(rebuilt, entry);
        assert!(!rebuilt.join("sentinel").exists());
        assert_eq!(fs::read(rebuilt.join("plugin.pack")).unwrap(), b"pack");
    }

    #[test]
    fn file_at_entry_path_is_corruption() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = tmp.path().join("demo.plug");
        write_bundle(&bundle, &[("plugin.pack", b"pack")]);

        let root = tmp.path().join(".cache");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("demo"), b"not a directory").unwrap();

        let cache = ArchiveCache::new(&root);
        match cache.resolve(&bundle) {
            Err(Error::CacheCorruption { path }) => assert_eq!(path, root.join("demo")),
            other => panic!("expected cache corruption, got {other:?}"),
        }
    }

    #[test]
    fn entry_name_strips_extension() {
        assert_eq!(entry_name(Path::new("/plugins/demo.plug")).unwrap(), "demo");
        assert_eq!(entry_name(Path::new("demo")).unwrap(), "demo");
        assert!(entry_name(Path::new("/")).is_err());
    }

    #[test]
    fn unsafe_entry_paths_are_rejected() {
        assert!(checked_entry_path(Path::new("../evil")).is_err());
        assert!(checked_entry_path(Path::new("/etc/passwd")).is_err());
        assert!(checked_entry_path(Path::new("nested/ok.pack")).unwrap().is_some());
        assert!(checked_entry_path(Path::new("")).unwrap().is_none());
    }

    #[test]
    fn directory_entries_create_directories_only() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = tmp.path().join("demo.plug");

        let file = fs::File::create(&bundle).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Directory);
        header.set_size(0);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, "lib/", &b""[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let cache = ArchiveCache::new(tmp.path().join(".cache"));
        let entry = cache.resolve(&bundle).unwrap();
        assert!(entry.join("lib").is_dir());
    }
}
