use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BridgeConfig;
use crate::host::{Host, PropertyValue};
use crate::utils::{absolute_normalized, artifact_file_name};

/// How a run of the [`ExclusionPatcher`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionOutcome {
    /// The host has no base directory property.
    NoBaseDirectory,
    /// No file named like the artifact exists in the watched directory.
    NotPresent(PathBuf),
    /// The candidate resolves to another real path; left to the host.
    SymbolicLink { candidate: PathBuf, target: PathBuf },
    AlreadyExcluded(PathBuf),
    Excluded(PathBuf),
    /// Something failed along the way. Never propagated.
    Failed(String),
}

impl ExclusionOutcome {
    /// Whether this run appended to the exclusion list.
    pub fn is_excluded(&self) -> bool {
        matches!(self, ExclusionOutcome::Excluded(_))
    }
}

impl fmt::Display for ExclusionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionOutcome::NoBaseDirectory => write!(f, "no base directory"),
            ExclusionOutcome::NotPresent(path) => write!(f, "{} does not exist", path.display()),
            ExclusionOutcome::SymbolicLink { candidate, target } => {
                write!(f, "{} links to {}", candidate.display(), target.display())
            }
            ExclusionOutcome::AlreadyExcluded(path) => write!(f, "{} is already excluded", path.display()),
            ExclusionOutcome::Excluded(path) => write!(f, "excluded {}", path.display()),
            ExclusionOutcome::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

/// Keeps the bridge artifact from being discovered a second time as an
/// ordinary plugin when it sits in the directory the host watches.
#[derive(Debug, Clone)]
pub struct ExclusionPatcher {
    base_directory_property: String,
    watched_directory: String,
}

impl ExclusionPatcher {
    pub fn new(base_directory_property: impl Into<String>, watched_directory: impl Into<String>) -> Self {
        Self {
            base_directory_property: base_directory_property.into(),
            watched_directory: watched_directory.into(),
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(&config.base_directory_property, &config.watched_directory)
    }

    /// Path of the artifact inside the watched directory, if the host has a
    /// base directory.
    pub fn candidate(&self, host: &dyn Host, artifact: &Path) -> Result<Option<PathBuf>, String> {
        let base_dir = match host.property(&self.base_directory_property) {
            Some(PropertyValue::Path(path)) => path,
            Some(other) => {
                return Err(format!(
                    "property '{}' holds a {}",
                    self.base_directory_property,
                    other.type_name()
                ));
            }
            None => return Ok(None),
        };
        let watched = base_dir.join(&self.watched_directory);
        // Real path of the directory, so only a link at the candidate itself
        // makes it differ from its canonical form.
        let watched = match fs::canonicalize(&watched) {
            Ok(real) => real,
            Err(_) => absolute_normalized(&watched)
                .map_err(|e| format!("cannot resolve watched directory: {}", e))?,
        };
        let file_name = artifact_file_name(artifact)
            .ok_or_else(|| format!("{} has no file name", artifact.display()))?;
        Ok(Some(watched.join(file_name)))
    }

    /// Run the patch. Never fails; every problem ends up in the outcome.
    pub fn apply(&self, host: &mut dyn Host, artifact: &Path) -> ExclusionOutcome {
        let outcome = self.try_apply(host, artifact);
        match &outcome {
            ExclusionOutcome::Excluded(path) => log::debug!("Excluded {} from plugin discovery", path.display()),
            ExclusionOutcome::Failed(message) => log::debug!("Exclusion patch skipped: {}", message),
            other => log::debug!("Exclusion patch not applied: {}", other),
        }
        outcome
    }

    fn try_apply(&self, host: &mut dyn Host, artifact: &Path) -> ExclusionOutcome {
        let candidate = match self.candidate(&*host, artifact) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return ExclusionOutcome::NoBaseDirectory,
            Err(message) => return ExclusionOutcome::Failed(message),
        };

        if !candidate.exists() {
            return ExclusionOutcome::NotPresent(candidate);
        }

        let real = match fs::canonicalize(&candidate) {
            Ok(real) => real,
            Err(e) => return ExclusionOutcome::Failed(format!("canonicalize {}: {}", candidate.display(), e)),
        };
        if real != candidate {
            return ExclusionOutcome::SymbolicLink { candidate, target: real };
        }

        match host.excluded_paths() {
            Ok(paths) if paths.contains(&candidate) => return ExclusionOutcome::AlreadyExcluded(candidate),
            Ok(_) => {}
            Err(e) => return ExclusionOutcome::Failed(e.to_string()),
        }

        match host.add_excluded_path(candidate.clone()) {
            Ok(()) => ExclusionOutcome::Excluded(candidate),
            Err(e) => ExclusionOutcome::Failed(e.to_string()),
        }
    }
}
