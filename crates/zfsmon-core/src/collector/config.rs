//! Collection settings and their defaults.

use std::path::PathBuf;

/// Default location of the ZFS kstat tree on Linux.
pub const DEFAULT_KSTAT_PATH: &str = "/proc/spl/kstat/zfs";

/// Counter categories read when none are configured.
///
/// `vdev_cache_stats` is deprecated and `xuio_stats` has no consumers on
/// Linux, so neither is part of the set.
pub const DEFAULT_KSTAT_METRICS: &[&str] = &[
    "abdstats",
    "arcstats",
    "dnodestats",
    "dbufcachestats",
    "dmu_tx",
    "fm",
    "vdev_mirror_stats",
    "zfetchstats",
    "zil",
];

/// Dataset properties queried when none are configured. `name` must come first.
pub const DEFAULT_DATASET_PROPERTIES: &[&str] = &["name", "avail", "used", "usedsnap", "usedds"];

/// Settings for a `ZfsCollector`.
///
/// Empty `kstat_path` or `kstat_metrics` fall back to the defaults when the
/// collector resolves them, so callers can pass through unset values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZfsConfig {
    /// Root of the kstat tree.
    pub kstat_path: PathBuf,
    /// Counter categories merged into the `zfs` record.
    pub kstat_metrics: Vec<String>,
    /// Emit one `zfs_pool` record per pool.
    pub pool_metrics: bool,
    /// Emit one `zfs_dataset` record per dataset.
    pub dataset_metrics: bool,
    /// Properties requested from `zfs list`.
    pub dataset_properties: Vec<String>,
}

impl Default for ZfsConfig {
    fn default() -> Self {
        Self {
            kstat_path: PathBuf::from(DEFAULT_KSTAT_PATH),
            kstat_metrics: to_strings(DEFAULT_KSTAT_METRICS),
            pool_metrics: false,
            dataset_metrics: false,
            dataset_properties: to_strings(DEFAULT_DATASET_PROPERTIES),
        }
    }
}

impl ZfsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kstat_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.kstat_path = path.into();
        self
    }

    pub fn with_kstat_metrics<S: Into<String>>(
        mut self,
        metrics: impl IntoIterator<Item = S>,
    ) -> Self {
        self.kstat_metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pool_metrics(mut self, enabled: bool) -> Self {
        self.pool_metrics = enabled;
        self
    }

    pub fn with_dataset_metrics(mut self, enabled: bool) -> Self {
        self.dataset_metrics = enabled;
        self
    }

    pub fn with_dataset_properties<S: Into<String>>(
        mut self,
        properties: impl IntoIterator<Item = S>,
    ) -> Self {
        self.dataset_properties = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Kstat root to read, falling back to the default when unset.
    pub fn resolved_kstat_path(&self) -> PathBuf {
        if self.kstat_path.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_KSTAT_PATH)
        } else {
            self.kstat_path.clone()
        }
    }

    /// Counter categories to read, falling back to the defaults when unset.
    pub fn resolved_kstat_metrics(&self) -> Vec<String> {
        if self.kstat_metrics.is_empty() {
            to_strings(DEFAULT_KSTAT_METRICS)
        } else {
            self.kstat_metrics.clone()
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ZfsConfig::default();
        assert_eq!(config.kstat_path, PathBuf::from("/proc/spl/kstat/zfs"));
        assert_eq!(config.kstat_metrics.len(), 9);
        assert!(!config.pool_metrics);
        assert!(!config.dataset_metrics);
        assert_eq!(config.dataset_properties[0], "name");
    }

    #[test]
    fn test_empty_overrides_fall_back() {
        let config = ZfsConfig::new()
            .with_kstat_path("")
            .with_kstat_metrics(Vec::<String>::new());

        assert_eq!(
            config.resolved_kstat_path(),
            PathBuf::from(DEFAULT_KSTAT_PATH)
        );
        assert_eq!(config.resolved_kstat_metrics().len(), 9);
    }

    #[test]
    fn test_overrides() {
        let config = ZfsConfig::new()
            .with_kstat_path("/tmp/kstat")
            .with_kstat_metrics(["arcstats", "zil"]);

        assert_eq!(config.resolved_kstat_path(), PathBuf::from("/tmp/kstat"));
        assert_eq!(config.resolved_kstat_metrics(), vec!["arcstats", "zil"]);
    }
}
