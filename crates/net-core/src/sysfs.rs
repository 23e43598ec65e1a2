//! Filesystem access used by the interface and VLAN queries
//!
//! Everything this crate learns about live interfaces comes from
//! `/sys/class/net` and `/proc/net/vlan`, read through [`FileSystem`] so
//! tests can point the queries at a temporary tree or a mock.

use std::fs;
use std::io;
use std::path::Path;

/// Narrow read-only view of the filesystem
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// True if `path` exists and is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// True if `path` exists and is a regular file
    fn is_file(&self, path: &Path) -> bool;

    /// Read the whole content of `path`
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Names of the entries in the directory `path`
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// [`FileSystem`] backed by the host's real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFileSystem;

impl FileSystem for HostFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            // Interface names are always valid UTF-8 on Linux
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        (**self).list_dir(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_host_filesystem() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("eth0")).unwrap();
        fs::write(temp_dir.path().join("config"), "line\n").unwrap();

        let host = HostFileSystem;
        assert!(host.is_dir(&temp_dir.path().join("eth0")));
        assert!(!host.is_file(&temp_dir.path().join("eth0")));
        assert!(host.is_file(&temp_dir.path().join("config")));
        assert_eq!(
            host.read_to_string(&temp_dir.path().join("config")).unwrap(),
            "line\n"
        );

        let mut names = host.list_dir(temp_dir.path()).unwrap();
        names.sort();
        assert_eq!(names, vec!["config", "eth0"]);

        assert!(host.list_dir(&temp_dir.path().join("missing")).is_err());
    }
}
