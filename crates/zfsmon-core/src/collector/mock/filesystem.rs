//! In-memory mock filesystem for testing collectors without a real kstat tree.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on hosts without the ZFS kernel module.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files and directories in memory, allowing tests to simulate
/// various kstat tree states without needing ZFS.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a pool directory with its `io` table under `kstat_path`.
    pub fn add_pool(&mut self, kstat_path: impl AsRef<Path>, pool: &str, io: &str) {
        self.add_file(kstat_path.as_ref().join(pool).join("io"), io);
    }

    /// Adds a counter category file under `kstat_path`.
    pub fn add_counters(&mut self, kstat_path: impl AsRef<Path>, category: &str, content: &str) {
        self.add_file(kstat_path.as_ref().join(category), content);
    }

    /// Loads a mock filesystem from a directory snapshot.
    ///
    /// The snapshot is mounted at `mount_point`. This is useful for
    /// regression tests with a copy of a real kstat tree.
    pub fn from_snapshot(dir: &Path, mount_point: &Path) -> io::Result<Self> {
        let mut fs = Self::new();
        load_directory_recursive(&mut fs, dir, mount_point)?;
        Ok(fs)
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }
}

fn load_directory_recursive(
    fs: &mut MockFs,
    real_path: &Path,
    virtual_path: &Path,
) -> io::Result<()> {
    fs.add_dir(virtual_path);

    for entry in std::fs::read_dir(real_path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let real_child = entry.path();
        let virtual_child = virtual_path.join(entry.file_name());

        if file_type.is_dir() {
            load_directory_recursive(fs, &real_child, &virtual_child)?;
        } else if file_type.is_file() {
            // Skip files that are not valid UTF-8
            if let Ok(content) = std::fs::read_to_string(&real_child) {
                fs.add_file(&virtual_child, content);
            }
        }
    }
    Ok(())
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/spl/kstat/zfs/arcstats", "header\n");

        assert!(fs.exists(Path::new("/proc/spl/kstat/zfs/arcstats")));
        assert!(fs.exists(Path::new("/proc/spl/kstat/zfs")));

        let content = fs
            .read_to_string(Path::new("/proc/spl/kstat/zfs/arcstats"))
            .unwrap();
        assert_eq!(content, "header\n");
    }

    #[test]
    fn test_mock_fs_read_dir() {
        let mut fs = MockFs::new();
        fs.add_pool("/kstat", "tank", "io table");
        fs.add_pool("/kstat", "rpool", "io table");
        fs.add_counters("/kstat", "arcstats", "counters");

        let entries = fs.read_dir(Path::new("/kstat")).unwrap();
        assert_eq!(entries.len(), 3); // tank, rpool, arcstats

        let tank_entries = fs.read_dir(Path::new("/kstat/tank")).unwrap();
        assert_eq!(tank_entries, vec![PathBuf::from("/kstat/tank/io")]);
    }

    #[test]
    fn test_mock_fs_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("tank")).unwrap();
        std::fs::write(dir.path().join("tank/io"), "io table").unwrap();
        std::fs::write(dir.path().join("zil"), "counters").unwrap();

        let fs = MockFs::from_snapshot(dir.path(), Path::new("/kstat")).unwrap();
        assert_eq!(
            fs.read_to_string(Path::new("/kstat/tank/io")).unwrap(),
            "io table"
        );
        assert!(fs.exists(Path::new("/kstat/zil")));
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        let result = fs.read_to_string(Path::new("/nonexistent"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
