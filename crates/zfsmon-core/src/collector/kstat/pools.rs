//! Discovery of imported pools from the kstat tree.

use std::path::{Path, PathBuf};

use crate::collector::traits::FileSystem;

/// Separator used when several pool or dataset names share one tag value.
pub const NAME_SEPARATOR: &str = "::";

/// File inside each pool directory holding the pool's I/O table.
const POOL_IO_FILE: &str = "io";

/// An imported pool and the location of its I/O statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub name: String,
    pub stats_path: PathBuf,
}

/// Finds every `<root>/*/io` file and returns one `Pool` per match.
///
/// Hidden entries are ignored and results are sorted by path. A missing or
/// unreadable root yields no pools: hosts without the ZFS module loaded
/// simply have nothing to report.
pub fn discover_pools<F: FileSystem>(fs: &F, root: &Path) -> Vec<Pool> {
    let Ok(entries) = fs.read_dir(root) else {
        return Vec::new();
    };

    let mut pools: Vec<Pool> = entries
        .into_iter()
        .filter_map(|entry| {
            let name = entry.file_name()?.to_str()?.to_string();
            if name.starts_with('.') {
                return None;
            }
            let stats_path = entry.join(POOL_IO_FILE);
            fs.exists(&stats_path).then_some(Pool { name, stats_path })
        })
        .collect();

    pools.sort_by(|a, b| a.stats_path.cmp(&b.stats_path));
    pools
}

/// Joins names into a single tag value; no names give an empty string.
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(NAME_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_discover_pools() {
        let mut fs = MockFs::new();
        fs.add_file("/kstat/tank/io", "");
        fs.add_file("/kstat/rpool/io", "");
        fs.add_file("/kstat/arcstats", "");
        fs.add_dir("/kstat/no_io_here");

        let pools = discover_pools(&fs, Path::new("/kstat"));
        assert_eq!(
            pools,
            vec![
                Pool {
                    name: "rpool".to_string(),
                    stats_path: PathBuf::from("/kstat/rpool/io"),
                },
                Pool {
                    name: "tank".to_string(),
                    stats_path: PathBuf::from("/kstat/tank/io"),
                },
            ]
        );
    }

    #[test]
    fn test_discover_pools_skips_hidden() {
        let mut fs = MockFs::new();
        fs.add_file("/kstat/.hidden/io", "");
        fs.add_file("/kstat/tank/io", "");

        let pools = discover_pools(&fs, Path::new("/kstat"));
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].name, "tank");
    }

    #[test]
    fn test_discover_pools_missing_root() {
        let fs = MockFs::new();
        assert!(discover_pools(&fs, Path::new("/proc/spl/kstat/zfs")).is_empty());
    }

    #[test]
    fn test_join_names() {
        let none: [&str; 0] = [];
        assert_eq!(join_names(&none), "");
        assert_eq!(join_names(&["tank"]), "tank");
        assert_eq!(join_names(&["tank", "rpool"]), "tank::rpool");
    }
}
