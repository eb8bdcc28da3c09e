use std::path::{Path, PathBuf};

use crate::host::{ClasspathExtender, HostError};
use crate::plugin_system::error::PluginSystemError;
use crate::utils::absolute_normalized;

/// Makes the bridge artifact visible to the host's primary loader.
///
/// The extension is applied at most once: after the first successful append,
/// later calls return the recorded location without touching the host.
#[derive(Debug, Default, Clone)]
pub struct ClasspathExtension {
    applied: Option<PathBuf>,
}

impl ClasspathExtension {
    pub fn new() -> Self {
        Self { applied: None }
    }

    pub fn is_applied(&self) -> bool {
        self.applied.is_some()
    }

    /// Location appended by the successful extension, if any.
    pub fn applied_location(&self) -> Option<&Path> {
        self.applied.as_deref()
    }

    /// Append `artifact` to the loader search path unless that already happened.
    ///
    /// A failure is fatal to the bootstrap: resolving services without the
    /// artifact on the search path cannot succeed.
    pub fn ensure<C>(&mut self, host: &mut C, artifact: &Path) -> Result<PathBuf, PluginSystemError>
    where
        C: ClasspathExtender + ?Sized,
    {
        if let Some(location) = &self.applied {
            log::debug!("Class path already extended with {}", location.display());
            return Ok(location.clone());
        }

        let location = absolute_normalized(artifact).map_err(|e| PluginSystemError::ClasspathExtension {
            location: artifact.to_path_buf(),
            source: HostError::io(e, "absolute", artifact.to_path_buf()),
        })?;

        host.append_to_classpath(&location)
            .map_err(|source| PluginSystemError::ClasspathExtension {
                location: location.clone(),
                source,
            })?;

        log::debug!("Appended {} to the class path", location.display());
        self.applied = Some(location.clone());
        Ok(location)
    }
}
