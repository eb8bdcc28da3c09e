use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Discovery locator for an extra mods or plugins folder.
///
/// This is the value the bridge stores in the host's custom discovery factory
/// properties, so the host's file based discovery also looks in the bridge's
/// `custom` folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFolderLocator {
    folder: PathBuf,
    name: String,
}

impl CustomFolderLocator {
    pub fn new(folder: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Locator arguments are accepted and ignored.
    pub fn init_arguments(&mut self, _arguments: &HashMap<String, String>) {}
}

impl fmt::Display for CustomFolderLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} locator at {}}}", self.name, self.folder.display())
    }
}
