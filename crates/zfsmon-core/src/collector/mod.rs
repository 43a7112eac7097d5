//! ZFS metrics collector for Linux.
//!
//! This module provides infrastructure for collecting pool, dataset and
//! kernel counter metrics from the ZFS kstat tree and the `zfs` tool, with
//! support for mocking both for testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        ZfsCollector                         │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │   kstat collectors  │   │     DatasetCollector        │  │
//! │  │  - <kstat>/*/io     │   │  - zfs list -Hp -o ...      │  │
//! │  │  - <kstat>/arcstats │   │                             │  │
//! │  │  - <kstat>/zil ...  │   │                             │  │
//! │  └──────────┬──────────┘   └──────────────┬──────────────┘  │
//! │             │                             │                 │
//! │      ┌──────▼──────┐               ┌──────▼──────┐          │
//! │      │  FileSystem │ (trait)       │CommandRunner│ (trait)  │
//! │      └──────┬──────┘               └──────┬──────┘          │
//! └─────────────┼─────────────────────────────┼─────────────────┘
//!               │                             │
//!        ┌──────┴──────┐              ┌───────┴───────┐
//!        │             │              │               │
//!   ┌────▼───┐   ┌─────▼──┐    ┌──────▼──────┐ ┌──────▼──────┐
//!   │ RealFs │   │ MockFs │    │SystemCommand│ │ MockCommand │
//!   │        │   │        │    │   Runner    │ │   Runner    │
//!   └────────┘   └────────┘    └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use zfsmon_core::collector::{RealFs, SystemCommandRunner, ZfsCollector, ZfsConfig};
//! use zfsmon_core::metrics::RecordBuffer;
//!
//! let config = ZfsConfig::default().with_pool_metrics(true);
//! let mut collector = ZfsCollector::new(RealFs::new(), SystemCommandRunner::new(), config);
//! let mut acc = RecordBuffer::new();
//! collector.collect(&mut acc).unwrap();
//! ```
//!
//! ## Testing (with mocks)
//!
//! ```
//! use zfsmon_core::collector::{MockCommandRunner, MockFs, ZfsCollector, ZfsConfig};
//! use zfsmon_core::metrics::RecordBuffer;
//!
//! let mut collector = ZfsCollector::new(
//!     MockFs::typical_host(),
//!     MockCommandRunner::typical_host(),
//!     ZfsConfig::default(),
//! );
//! let mut acc = RecordBuffer::new();
//! collector.collect(&mut acc).unwrap();
//! assert_eq!(acc.records()[0].measurement, "zfs");
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod command;
pub mod config;
pub mod datasets;
pub mod kstat;
pub mod mock;
pub mod traits;

pub use collector::{CollectError, CollectorTiming, POOL_MEASUREMENT, ZFS_MEASUREMENT, ZfsCollector};
pub use command::{CommandError, CommandRunner, SystemCommandRunner};
pub use config::ZfsConfig;
pub use datasets::{DATASET_MEASUREMENT, DatasetCollector};
pub use mock::{MockCommandRunner, MockFs};
pub use traits::{FileSystem, RealFs};
