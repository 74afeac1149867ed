//! Native-to-portable path helpers

use std::path::{Path, PathBuf};

use crate::error::{CheckpointError, Result};

/// Render a native path with POSIX separators. Only matters on Windows;
/// POSIX hosts already use forward slashes.
pub fn posix_path(path: &Path) -> String {
    let native = path.to_string_lossy();
    if cfg!(windows) {
        native.replace('\\', "/")
    } else {
        native.into_owned()
    }
}

/// Current working directory, without a trailing slash.
pub fn current_working_directory() -> Result<PathBuf> {
    std::env::current_dir().map_err(|source| CheckpointError::io(Path::new("."), source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posix_path_passthrough() {
        assert_eq!(posix_path(Path::new("/tmp/checkpoint/p.bin")), "/tmp/checkpoint/p.bin");
    }

    #[test]
    fn test_current_working_directory() {
        let cwd = current_working_directory().unwrap();
        assert!(cwd.is_absolute());
        assert!(!posix_path(&cwd).ends_with('/'));
    }
}
