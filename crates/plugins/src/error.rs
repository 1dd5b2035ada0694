use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::Dependency;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("plugin cache entry {path} exists but is not a directory")]
    CacheCorruption { path: PathBuf },

    #[error("no pack on the search path provides unit '{name}'")]
    UnitNotFound { name: String },

    #[error("failed to parse descriptor of unit '{name}': {source}")]
    UnitParse {
        name: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(
        "dependency problems for plugin '{plugin}': {} missing, {} conflicting",
        .missing.len(),
        .conflicting.len()
    )]
    Dependency {
        plugin: String,
        missing: Vec<Dependency>,
        conflicting: Vec<Dependency>,
    },

    #[error("failed to load plugin {bundle}: {source}")]
    Plugin {
        bundle: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn unit_not_found(name: impl Into<String>) -> Self {
        Self::UnitNotFound { name: name.into() }
    }

    #[must_use]
    pub fn plugin(
        bundle: &Path,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Plugin {
            bundle: bundle.to_path_buf(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
