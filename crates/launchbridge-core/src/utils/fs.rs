use std::io;
use std::path::{Component, Path, PathBuf};

/// File name of an artifact location, e.g. `bridge.jar` for `/game/mods/bridge.jar`.
pub fn artifact_file_name<P: AsRef<Path>>(location: P) -> Option<String> {
    location
        .as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Does not touch the filesystem, so symlinks survive.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    normalized.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_)) | Some(Component::ParentDir)
                );
                if at_root && !normalized.has_root() {
                    normalized.push("..");
                } else if !at_root {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Absolute, lexically normalized form of `path`, resolved against the current
/// directory when relative.
pub fn absolute_normalized<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    Ok(normalize_path(std::path::absolute(path)?))
}
