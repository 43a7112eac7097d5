//! Main collector that combines pool, dataset and counter collection.
//!
//! The `ZfsCollector` struct drives one full pass over the kstat tree and
//! `zfs list`, delivering the resulting records to an `Accumulator`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::collector::command::{CommandError, CommandRunner};
use crate::collector::config::ZfsConfig;
use crate::collector::datasets::DatasetCollector;
use crate::collector::kstat::parser::{parse_counter_category, parse_pool_io};
use crate::collector::kstat::{ParseError, Pool, discover_pools, join_names};
use crate::collector::traits::FileSystem;
use crate::metrics::{Accumulator, Fields, Tags};

/// Measurement of the aggregate counter record.
pub const ZFS_MEASUREMENT: &str = "zfs";

/// Measurement of per-pool I/O records.
pub const POOL_MEASUREMENT: &str = "zfs_pool";

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// A pool `io` table could not be read.
    Io { path: PathBuf, source: io::Error },
    /// A pool `io` table has the wrong shape or a bad value.
    Parse(ParseError),
    /// `zfs list` could not be run or exited with an error.
    Command(CommandError),
    /// A dataset property value is not a valid 64-bit integer.
    DatasetField {
        dataset: String,
        property: String,
        value: String,
    },
    /// The dataset property list cannot be queried.
    InvalidProperties(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            CollectError::Parse(e) => write!(f, "parse error: {}", e),
            CollectError::Command(e) => write!(f, "{}", e),
            CollectError::DatasetField {
                dataset,
                property,
                value,
            } => write!(
                f,
                "error parsing {} {:?} of dataset {}",
                property, value, dataset
            ),
            CollectError::InvalidProperties(msg) => {
                write!(f, "invalid dataset properties: {}", msg)
            }
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io { source, .. } => Some(source),
            CollectError::Parse(e) => Some(e),
            CollectError::Command(e) => Some(e),
            CollectError::DatasetField { .. } | CollectError::InvalidProperties(_) => None,
        }
    }
}

impl From<ParseError> for CollectError {
    fn from(e: ParseError) -> Self {
        CollectError::Parse(e)
    }
}

impl From<CommandError> for CollectError {
    fn from(e: CommandError) -> Self {
        CollectError::Command(e)
    }
}

/// Timing information for each collection phase.
///
/// Used for debugging and performance monitoring.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total pass time.
    pub total: Duration,
    /// Time to scan the kstat tree for pools.
    pub discovery: Duration,
    /// Time to read per-pool `io` tables (zero when pool metrics are off).
    pub pools: Duration,
    /// Time spent in `zfs list`, including parsing.
    pub datasets: Duration,
    /// Time to read and merge counter categories.
    pub counters: Duration,
}

/// Collects ZFS pool, dataset and kstat counter metrics.
pub struct ZfsCollector<F: FileSystem, R: CommandRunner> {
    fs: F,
    runner: R,
    config: ZfsConfig,
    datasets: DatasetCollector,
    /// Timing information from the last successful collect call.
    last_timing: Option<CollectorTiming>,
}

impl<F: FileSystem, R: CommandRunner> ZfsCollector<F, R> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `runner` - Runs `zfs list` (real or mock)
    /// * `config` - Paths, categories and detail switches
    pub fn new(fs: F, runner: R, config: ZfsConfig) -> Self {
        let datasets =
            DatasetCollector::new(config.dataset_properties.clone(), config.dataset_metrics);
        Self {
            fs,
            runner,
            config,
            datasets,
            last_timing: None,
        }
    }

    pub fn config(&self) -> &ZfsConfig {
        &self.config
    }

    /// Returns timing information from the last successful collect call.
    pub fn last_timing(&self) -> Option<&CollectorTiming> {
        self.last_timing.as_ref()
    }

    /// Runs one collection pass.
    ///
    /// Emits, in order: one `zfs_pool` record per pool (when enabled), one
    /// `zfs_dataset` record per dataset (when enabled) and one aggregate
    /// `zfs` record tagged with the joined pool and dataset names.
    ///
    /// Pool table and dataset failures abort the pass. Missing counter
    /// files and bad counter values never do.
    pub fn collect(&mut self, acc: &mut dyn Accumulator) -> Result<(), CollectError> {
        let total_start = Instant::now();
        let mut timing = CollectorTiming::default();

        let kstat_path = self.config.resolved_kstat_path();
        let categories = self.config.resolved_kstat_metrics();

        let start = Instant::now();
        let pools = discover_pools(&self.fs, &kstat_path);
        timing.discovery = start.elapsed();

        let pool_names: Vec<&str> = pools.iter().map(|p| p.name.as_str()).collect();
        let mut tags = Tags::new();
        tags.insert("pools".to_string(), join_names(pool_names.as_slice()));

        if self.config.pool_metrics {
            let start = Instant::now();
            for pool in &pools {
                let fields = self.collect_pool_io(pool)?;
                let mut pool_tags = Tags::new();
                pool_tags.insert("pool".to_string(), pool.name.clone());
                acc.add_fields(POOL_MEASUREMENT, fields, pool_tags);
            }
            timing.pools = start.elapsed();
        }

        let start = Instant::now();
        let dataset_names = self.datasets.gather(&self.runner, acc)?;
        timing.datasets = start.elapsed();
        tags.insert("datasets".to_string(), dataset_names);

        let start = Instant::now();
        let fields = self.collect_counters(&kstat_path, &categories);
        timing.counters = start.elapsed();

        acc.add_fields(ZFS_MEASUREMENT, fields, tags);

        timing.total = total_start.elapsed();
        debug!(
            pools = pools.len(),
            total_us = timing.total.as_micros() as u64,
            discovery_us = timing.discovery.as_micros() as u64,
            pools_us = timing.pools.as_micros() as u64,
            datasets_us = timing.datasets.as_micros() as u64,
            counters_us = timing.counters.as_micros() as u64,
            "collection pass finished"
        );
        self.last_timing = Some(timing);

        Ok(())
    }

    /// Reads and parses a pool's `io` table.
    fn collect_pool_io(&self, pool: &Pool) -> Result<Fields, CollectError> {
        let content =
            self.fs
                .read_to_string(&pool.stats_path)
                .map_err(|source| CollectError::Io {
                    path: pool.stats_path.clone(),
                    source,
                })?;
        Ok(parse_pool_io(&pool.stats_path, &content)?)
    }

    /// Merges all readable counter categories into one field map.
    fn collect_counters(&self, kstat_path: &Path, categories: &[String]) -> Fields {
        let mut fields = Fields::new();
        for category in categories {
            let path = kstat_path.join(category);
            match self.fs.read_to_string(&path) {
                Ok(content) => parse_counter_category(category, &content, &mut fields),
                Err(e) => {
                    debug!(category = %category, error = %e, "skipping counter category");
                }
            }
        }
        fields
    }
}
