//! Dependency and conflict validation against a plugin registry.

use tracing::debug;

use manifold_versions::compare::compare;

use crate::{
    error::{Error, Result},
    registry::{PluginMetadata, PluginRegistry},
};

/// Validate a plugin's declared dependencies against already-known plugins.
///
/// Both passes always run to completion so one failure reports the full
/// problem set: required dependencies that are absent or version-mismatched,
/// and conflicting dependencies that are present with a matching version.
/// A present plugin whose version does not match the conflict specifier is
/// not a conflict.
pub fn check(registry: &dyn PluginRegistry, metadata: &dyn PluginMetadata) -> Result<()> {
    let mut missing = Vec::new();
    for dependency in metadata.required_dependencies() {
        match registry.plugin(dependency.name()) {
            None => missing.push(dependency.clone()),
            Some(candidate) => {
                let relation = compare(dependency.version(), candidate.version());
                if !relation.is_satisfied() {
                    missing.push(dependency.clone());
                }
            },
        }
    }

    let mut conflicting = Vec::new();
    for dependency in metadata.conflicting_dependencies() {
        if let Some(candidate) = registry.plugin(dependency.name())
            && compare(dependency.version(), candidate.version()).is_satisfied()
        {
            conflicting.push(dependency.clone());
        }
    }

    if !missing.is_empty() || !conflicting.is_empty() {
        return Err(Error::Dependency {
            plugin: metadata.name().to_string(),
            missing,
            conflicting,
        });
    }

    debug!(plugin = metadata.name(), "dependencies satisfied");
    Ok(())
}
